//! Registered index definitions.

use super::definition::IndexDefinition;
use crate::error::CoreResult;
use parking_lot::RwLock;
use std::sync::Arc;

/// Ordered, append-only set of index definitions.
///
/// Registration order is preserved and is the order in which indexes
/// contribute write operations. Names are not deduplicated.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    definitions: RwLock<Vec<Arc<IndexDefinition>>>,
}

impl IndexRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a definition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidDefinition`]; the registry is
    /// unchanged in that case.
    pub fn register(&self, definition: IndexDefinition) -> CoreResult<Arc<IndexDefinition>> {
        definition.validate()?;
        let definition = Arc::new(definition);
        let mut definitions = self.definitions.write();
        if definitions.iter().any(|d| d.name == definition.name) {
            tracing::debug!(name = %definition.name, "registering duplicate index name");
        }
        definitions.push(Arc::clone(&definition));
        Ok(definition)
    }

    /// Returns the current definitions in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<IndexDefinition>> {
        self.definitions.read().clone()
    }

    /// Returns the first definition registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<IndexDefinition>> {
        self.definitions
            .read()
            .iter()
            .find(|d| d.name == name)
            .cloned()
    }

    /// Returns the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}
