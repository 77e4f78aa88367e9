//! Index command implementation.

use super::{CliError, Workspace};
use logdex_core::{IndexEntry, ViewConfig, CHECKPOINT_KEY};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Result of indexing a messages file.
#[derive(Debug, Serialize)]
pub struct IndexReport {
    /// Messages read from the file.
    pub messages: usize,
    /// Write operations issued.
    pub written: usize,
    /// Entries held per index.
    pub indexes: Vec<IndexCount>,
}

/// Entry count for one index.
#[derive(Debug, Serialize)]
pub struct IndexCount {
    /// Index name.
    pub name: String,
    /// Stored entries.
    pub entries: usize,
}

/// Indexes `messages` with the definitions in `indexes`.
pub fn execute(
    indexes: &Path,
    messages: &Path,
    config: ViewConfig,
) -> Result<IndexReport, CliError> {
    let ws = Workspace::load(indexes, Some(messages), config)?;
    let written = ws.ingest()?;

    let mut counts: BTreeMap<String, usize> = ws
        .view
        .indexes()
        .iter()
        .map(|d| (d.name.clone(), 0))
        .collect();
    for (key, value) in ws.kv.entries() {
        if key.as_slice() == CHECKPOINT_KEY {
            continue;
        }
        let entry = IndexEntry::decode(&key, &value)?;
        *counts.entry(entry.index).or_default() += 1;
    }

    Ok(IndexReport {
        messages: ws.messages.len(),
        written,
        indexes: counts
            .into_iter()
            .map(|(name, entries)| IndexCount { name, entries })
            .collect(),
    })
}

/// Runs the index command.
pub fn run(
    indexes: &Path,
    messages: &Path,
    config: ViewConfig,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = execute(indexes, messages, config)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Indexed {} messages ({} writes)",
                report.messages, report.written
            );
            for index in &report.indexes {
                println!("  {:<24} {:>8} entries", index.name, index.entries);
            }
        }
    }

    Ok(())
}
