//! Logdex CLI
//!
//! Command-line tools for building and querying index views over
//! message logs held in JSON files.
//!
//! # Commands
//!
//! - `index` - Index a messages file and report entry counts
//! - `query` - Index a messages file and run a query request
//! - `explain` - Show the plan chosen for a query request
//!
//! # Input files
//!
//! - indexes: `[{"name": "by-author", "path": ["author"]}]`
//! - messages: `[{"log": "L1", "content": {"author": "alice"}}]`
//! - request: `{"range": {"index": "by-author", "gte": ["a"]}}` or
//!   `{"filter": {"filters": [{"path": ["author"], "op": {"eq": "bob"}}]}}`

mod commands;

use clap::{Parser, Subcommand};
use logdex_core::ViewConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Logdex command-line index tools.
#[derive(Parser)]
#[command(name = "logdex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the index definitions file
    #[arg(global = true, short, long)]
    indexes: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a messages file and report entry counts
    Index {
        /// Path to the messages file
        #[arg(short, long)]
        messages: PathBuf,

        /// Maximum messages per atomic write
        #[arg(long, default_value_t = ViewConfig::default().max_batch)]
        max_batch: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Index a messages file and run a query request
    Query {
        /// Path to the messages file
        #[arg(short, long)]
        messages: PathBuf,

        /// Path to the query request file
        #[arg(short, long)]
        request: PathBuf,

        /// Slots per log in the full-scan merge
        #[arg(long, default_value_t = ViewConfig::default().fan_in_buffer)]
        fan_in_buffer: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the plan chosen for a query request
    Explain {
        /// Path to the query request file
        #[arg(short, long)]
        request: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Index {
            messages,
            max_batch,
            format,
        } => {
            let indexes = cli.indexes.ok_or("Index definitions required for index")?;
            let config = ViewConfig::new().max_batch(max_batch);
            commands::index::run(&indexes, &messages, config, &format)?;
        }
        Commands::Query {
            messages,
            request,
            fan_in_buffer,
            format,
        } => {
            let indexes = cli.indexes.ok_or("Index definitions required for query")?;
            let config = ViewConfig::new().fan_in_buffer(fan_in_buffer);
            commands::query::run(&indexes, &messages, &request, config, &format)?;
        }
        Commands::Explain { request, format } => {
            let indexes = cli.indexes.ok_or("Index definitions required for explain")?;
            commands::explain::run(&indexes, &request, &format)?;
        }
        Commands::Version => {
            println!("Logdex CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Logdex Core v{}", logdex_core::VERSION);
        }
    }

    Ok(())
}
