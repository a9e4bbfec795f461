//! Test doubles and common utilities for contract tests
//!
//! These doubles stand in for the host field store and record what the
//! widget did to it.

#![allow(dead_code)]

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, mpsc};
use vidext_core::error::{Error, Result};
use vidext_core::{FieldStore, FormController, OptionShape, WidgetConfig, WriteEvent};

/// A field store that records every write and can be told to fail
#[derive(Clone, Default)]
pub struct RecordingFieldStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
    writes: Arc<Mutex<Vec<(String, Option<Value>)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial field values (not recorded as writes)
    pub fn with_fields<const N: usize>(fields: [(&str, Value); N]) -> Self {
        let store = Self::new();
        {
            let mut values = store.values.lock().unwrap();
            for (field, value) in fields {
                values.insert(field.to_string(), value);
            }
        }
        store
    }

    /// Make writes to a field fail
    pub fn fail_field(&self, field: &str) {
        self.failing.lock().unwrap().insert(field.to_string());
    }

    /// Make writes to a field succeed again
    pub fn heal_field(&self, field: &str) {
        self.failing.lock().unwrap().remove(field);
    }

    /// All attempted writes in the order they reached the store
    pub fn writes(&self) -> Vec<(String, Option<Value>)> {
        self.writes.lock().unwrap().clone()
    }

    /// Attempted writes to one field
    pub fn writes_to(&self, field: &str) -> Vec<Option<Value>> {
        self.writes()
            .into_iter()
            .filter(|(f, _)| f == field)
            .map(|(_, v)| v)
            .collect()
    }
}

#[async_trait::async_trait]
impl FieldStore for RecordingFieldStore {
    fn get_value(&self, field: &str) -> Option<Value> {
        self.values.lock().unwrap().get(field).cloned()
    }

    async fn set_value(&self, field: &str, value: Option<Value>) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((field.to_string(), value.clone()));

        if self.failing.lock().unwrap().contains(field) {
            return Err(Error::field_store(format!("{} rejected by host", field)));
        }

        let mut values = self.values.lock().unwrap();
        match value {
            Some(value) => {
                values.insert(field.to_string(), value);
            }
            None => {
                values.remove(field);
            }
        }
        Ok(())
    }
}

/// A field store whose writes wait until the test releases them
#[derive(Clone)]
pub struct GatedFieldStore {
    pub inner: RecordingFieldStore,
    gate: Arc<Semaphore>,
}

impl GatedFieldStore {
    pub fn new(inner: RecordingFieldStore) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    /// Let `n` more writes through
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait::async_trait]
impl FieldStore for GatedFieldStore {
    fn get_value(&self, field: &str) -> Option<Value> {
        self.inner.get_value(field)
    }

    async fn set_value(&self, field: &str, value: Option<Value>) -> Result<()> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| Error::field_store(e.to_string()))?;
        permit.forget();

        self.inner.set_value(field, value).await
    }
}

/// Mount a controller over any test store
pub fn mount<S>(store: &S, shape: OptionShape) -> (FormController, mpsc::Receiver<WriteEvent>)
where
    S: FieldStore + Clone + 'static,
{
    FormController::new(Arc::new(store.clone()), WidgetConfig::new(shape))
        .expect("controller construction succeeds")
}

/// Collect every event until the writer stops
pub async fn collect_events(mut events: mpsc::Receiver<WriteEvent>) -> Vec<WriteEvent> {
    let mut seen = Vec::new();
    while let Some(event) = events.recv().await {
        seen.push(event);
    }
    seen
}
