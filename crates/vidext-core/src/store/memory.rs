// # Memory Field Store
//
// In-memory implementation of FieldStore.
//
// ## Purpose
//
// Holds entry fields in a map for the lifetime of the process. Useful for
// tests, previews, and hosts that persist the entry themselves after the
// editing session.
//
// ## Crash Behavior
//
// - All fields are lost on restart/crash
// - The widget mounts with empty fields on the next start

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::Error;
use crate::traits::FieldStore;

/// In-memory field store implementation
///
/// Fields live in a HashMap behind a synchronous RwLock so that snapshot
/// reads never await. Clones share the same map.
///
/// # Example
///
/// ```rust,no_run
/// use vidext_core::store::MemoryFieldStore;
/// use vidext_core::traits::FieldStore;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryFieldStore::new();
///
///     store.set_value("platform", Some(json!("youtube"))).await?;
///     assert_eq!(store.get_value("platform"), Some(json!("youtube")));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFieldStore {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryFieldStore {
    /// Create a new empty memory field store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with field values
    pub fn with_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Get the number of fields holding a value
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if no field holds a value
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of all field values
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear all fields
    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl FieldStore for MemoryFieldStore {
    fn get_value(&self, field: &str) -> Option<Value> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(field).cloned()
    }

    async fn set_value(&self, field: &str, value: Option<Value>) -> Result<(), Error> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match value {
            Some(value) => {
                guard.insert(field.to_string(), value);
            }
            None => {
                guard.remove(field);
            }
        }
        Ok(())
    }
}
