//! Query command implementation.

use super::{read_request, CliError, Workspace};
use logdex_codec::Value;
use logdex_core::{Message, ViewConfig};
use serde::Serialize;
use std::path::Path;

/// One query result.
#[derive(Debug, Serialize)]
pub struct QueryHit {
    /// Message identifier, `<log>@<sequence>`.
    pub id: String,
    /// Message content.
    pub content: Value,
}

impl From<Message> for QueryHit {
    fn from(message: Message) -> Self {
        Self {
            id: message.id().to_string(),
            content: message.content,
        }
    }
}

/// Indexes `messages` and runs the request in `request`.
pub fn execute(
    indexes: &Path,
    messages: &Path,
    request: &Path,
    config: ViewConfig,
) -> Result<Vec<QueryHit>, CliError> {
    let ws = Workspace::load(indexes, Some(messages), config)?;
    let request = read_request(request)?;
    ws.ingest()?;

    let stream = ws.view.query(ws.logs.clone(), &request)?;
    let mut hits = Vec::new();
    for message in stream {
        hits.push(QueryHit::from(message?));
    }
    Ok(hits)
}

/// Runs the query command.
pub fn run(
    indexes: &Path,
    messages: &Path,
    request: &Path,
    config: ViewConfig,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let hits = execute(indexes, messages, request, config)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        _ => {
            for hit in &hits {
                println!("{}  {}", hit.id, serde_json::to_string(&hit.content)?);
            }
            println!("{} result(s)", hits.len());
        }
    }

    Ok(())
}
