//! CLI command implementations.

pub mod explain;
pub mod index;
pub mod query;

use logdex_codec::Value;
use logdex_core::{
    CoreError, IndexDefinition, InMemoryLogStore, LogView, Message, QueryRequest, ViewConfig,
};
use logdex_storage::InMemoryKvStore;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading command inputs.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Offending file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An input file is not valid JSON for its role.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The view rejected the input.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// A message to append, as written in a messages file.
#[derive(Debug, Deserialize)]
struct SeedMessage {
    log: String,
    content: Value,
}

/// Reads and parses a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a query request file.
pub fn read_request(path: &Path) -> Result<QueryRequest, CliError> {
    read_json(path)
}

/// An in-memory view loaded from files.
pub struct Workspace {
    /// View over `kv` with the loaded indexes.
    pub view: LogView,
    /// Index store.
    pub kv: InMemoryKvStore,
    /// Logs holding the loaded messages.
    pub logs: Arc<InMemoryLogStore>,
    /// Messages in file order, with their assigned sequences.
    pub messages: Vec<Message>,
}

impl Workspace {
    /// Loads index definitions and, optionally, messages.
    ///
    /// Messages are appended to their logs but not indexed yet.
    pub fn load(
        indexes: &Path,
        messages: Option<&Path>,
        config: ViewConfig,
    ) -> Result<Self, CliError> {
        let definitions: Vec<IndexDefinition> = read_json(indexes)?;
        let kv = InMemoryKvStore::new();
        let view = LogView::new(Arc::new(kv.clone()), config).with_indexes(definitions)?;

        let logs = Arc::new(InMemoryLogStore::new());
        let seeds: Vec<SeedMessage> = match messages {
            Some(path) => read_json(path)?,
            None => Vec::new(),
        };
        let messages = seeds
            .into_iter()
            .map(|seed| logs.create_log(seed.log).append(seed.content))
            .collect();

        tracing::debug!(indexes = view.indexes().len(), "loaded workspace");
        Ok(Self {
            view,
            kv,
            logs,
            messages,
        })
    }

    /// Indexes every loaded message and returns the entry count.
    pub fn ingest(&self) -> Result<usize, CliError> {
        let written = self.view.index(&self.messages)?;
        self.view.notify_indexed(&self.messages);
        Ok(written)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub const INDEXES: &str = r#"[
        {"name": "by-author", "path": ["author"]},
        {"name": "by-tag", "path": [["tags", 0], ["tags", 1]]}
    ]"#;

    pub const MESSAGES: &str = r#"[
        {"log": "L1", "content": {"author": "alice", "tags": ["rust", "db"]}},
        {"log": "L2", "content": {"author": "bob", "tags": ["db"]}},
        {"log": "L1", "content": {"author": "carol", "tags": []}}
    ]"#;

    pub fn json_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn load_appends_without_indexing() {
        let indexes = json_file(INDEXES);
        let messages = json_file(MESSAGES);
        let ws = Workspace::load(indexes.path(), Some(messages.path()), ViewConfig::default())
            .unwrap();

        assert_eq!(ws.messages.len(), 3);
        assert_eq!(ws.messages[2].id().to_string(), "L1@1");
        assert!(ws.kv.is_empty());

        // alice, bob, carol, rust, db, db
        assert_eq!(ws.ingest().unwrap(), 6);
        assert_eq!(ws.kv.len(), 6);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_json::<Vec<IndexDefinition>>(Path::new("/nonexistent/indexes.json"))
            .unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let file = json_file("{not json");
        let err = read_json::<Vec<IndexDefinition>>(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
    }

    #[test]
    fn invalid_definition_is_rejected() {
        let indexes = json_file(r#"[{"name": "__private", "path": ["a"]}]"#);
        let err = Workspace::load(indexes.path(), None, ViewConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Core(CoreError::InvalidDefinition { .. })));
    }
}
