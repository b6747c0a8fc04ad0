//! Schema registry for named schema storage.
//!
//! This module provides the [`SchemaRegistry`] type that stores schemas under
//! string names so callers can validate records by record kind.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::record::Record;
use crate::schema::Schema;
use crate::ValidationResult;

/// Type alias for the schema storage map.
type SchemaMap = Arc<RwLock<IndexMap<String, Arc<Schema>>>>;

/// A thread-safe registry of named schemas.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>` for thread-safe access:
/// - Multiple threads can validate concurrently (read-only access)
/// - Registration operations are serialized (write access)
///
/// Clones share the same storage.
///
/// # Example
///
/// ```rust
/// use verdict::{SchemaRegistry, Schema};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register("User", Schema::new().rules("name", "required|min_len:2"))
///     .unwrap();
///
/// let result = registry.validate("User", &json!({"name": "Al"})).unwrap();
/// assert!(result.is_success());
///
/// assert!(registry.validate("Order", &json!({})).is_err());
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    /// Creates a new empty schema registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema with the given name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered.
    pub fn register(&self, name: impl Into<String>, schema: Schema) -> Result<(), RegistryError> {
        let name = name.into();
        let mut schemas = self.schemas.write();

        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        tracing::debug!(schema = %name, fields = schema.len(), "registered schema");
        schemas.insert(name, Arc::new(schema));
        Ok(())
    }

    /// Retrieves a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Returns the registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.schemas.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// Validates a record against a named schema.
    ///
    /// The lock is released before validation starts.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if the schema name doesn't exist.
    pub fn validate<R: Record + ?Sized>(
        &self,
        schema_name: &str,
        record: &R,
    ) -> Result<ValidationResult<()>, RegistryError> {
        let schema = self
            .get(schema_name)
            .ok_or_else(|| RegistryError::SchemaNotFound(schema_name.to_string()))?;

        Ok(schema.validate(record))
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to validate with a schema name that doesn't exist.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_get() {
        let registry = SchemaRegistry::new();
        registry
            .register("User", Schema::new().rules("name", "required"))
            .unwrap();

        assert!(registry.get("User").is_some());
        assert!(registry.get("Unknown").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = SchemaRegistry::new();
        registry.register("User", Schema::new()).unwrap();

        let err = registry.register("User", Schema::new()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("User".to_string()));
        assert_eq!(err.to_string(), "schema 'User' already registered");
    }

    #[test]
    fn test_names_in_registration_order() {
        let registry = SchemaRegistry::new();
        for name in ["Zebra", "Apple", "Mango"] {
            registry.register(name, Schema::new()).unwrap();
        }
        assert_eq!(registry.names(), vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn test_validate_unknown_schema() {
        let registry = SchemaRegistry::new();
        let err = registry.validate("Missing", &json!({})).unwrap_err();
        assert_eq!(err, RegistryError::SchemaNotFound("Missing".to_string()));
    }

    #[test]
    fn test_clone_shares_storage() {
        let registry = SchemaRegistry::new();
        let clone = registry.clone();
        clone.register("Shared", Schema::new()).unwrap();
        assert!(registry.get("Shared").is_some());
    }
}
