//! Index definitions.

use super::path::PathSpec;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Prefix reserved for internal keys. Index names may not start with it.
pub const RESERVED_PREFIX: &str = "__";

/// A named index over message content.
///
/// Definitions are immutable once registered. Two definitions may share a
/// name; both then write into, and are read from, the same key range.
///
/// # Example
///
/// ```rust
/// use logdex_core::{IndexDefinition, PathSpec};
///
/// let def: IndexDefinition =
///     serde_json::from_str(r#"{"name": "author", "path": ["author"]}"#).unwrap();
/// assert_eq!(def, IndexDefinition::new("author", PathSpec::field(["author"])));
/// assert!(!def.exact);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name; the first element of every key the index writes.
    pub name: String,
    /// What to extract from each message.
    pub path: PathSpec,
    /// Exact indexes only answer equality lookups.
    #[serde(default)]
    pub exact: bool,
}

impl IndexDefinition {
    /// Creates a range-capable definition.
    pub fn new(name: impl Into<String>, path: PathSpec) -> Self {
        Self {
            name: name.into(),
            path,
            exact: false,
        }
    }

    /// Marks the definition as equality-only.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// Checks the name and path spec.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDefinition`] for an empty or reserved
    /// name or an unusable path spec.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::invalid_definition("index name is empty"));
        }
        if self.name.starts_with(RESERVED_PREFIX) {
            return Err(CoreError::invalid_definition(format!(
                "index name {:?} uses the reserved prefix {RESERVED_PREFIX:?}",
                self.name
            )));
        }
        self.path.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_definition() {
        let def = IndexDefinition::new("author", PathSpec::field(["author"]));
        assert!(def.validate().is_ok());
        assert!(!def.exact);
        assert!(def.exact().exact);
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", "__checkpoint", "__"] {
            let def = IndexDefinition::new(name, PathSpec::field(["a"]));
            assert!(matches!(
                def.validate(),
                Err(CoreError::InvalidDefinition { .. })
            ));
        }
        assert!(IndexDefinition::new("_one", PathSpec::field(["a"]))
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_empty_path() {
        let def = IndexDefinition::new("a", PathSpec::Field(vec![]));
        assert!(def.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        let def = IndexDefinition::new(
            "tags",
            PathSpec::alternatives([
                PathSpec::field(["tags", "0"]),
                PathSpec::field(["tags", "1"]),
            ]),
        )
        .exact();
        let json = serde_json::to_string(&def).unwrap();
        let back: IndexDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }
}
