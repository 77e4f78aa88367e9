//! Explain command implementation.

use super::{read_request, CliError, Workspace};
use logdex_core::{QueryPlan, ViewConfig};
use std::path::Path;

/// Plans the request in `request` against the definitions in `indexes`.
///
/// No messages are loaded; planning only looks at the registry.
pub fn execute(indexes: &Path, request: &Path) -> Result<QueryPlan, CliError> {
    let ws = Workspace::load(indexes, None, ViewConfig::default())?;
    let request = read_request(request)?;
    Ok(ws.view.explain_query(&request)?)
}

/// Runs the explain command.
pub fn run(
    indexes: &Path,
    request: &Path,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = execute(indexes, request)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        _ => println!("{plan}"),
    }

    Ok(())
}
