//! In-memory adapters for tests and embedding.
//!
//! Both types are cheap clones over shared state, so a test can keep a handle
//! while the manager owns another and inspect what was written.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::adapter::{DocumentIo, SettingsAdapter};
use crate::error::AdapterError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct AdapterState {
    schema: Value,
    settings: Map<String, Value>,
    load_failure: Option<String>,
    save_failure: Option<String>,
    schema_loads: usize,
    saves: usize,
}

/// [`SettingsAdapter`] backed by a schema and settings map held in memory.
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    name: Arc<str>,
    state: Arc<Mutex<AdapterState>>,
}

impl MemoryAdapter {
    pub fn new(name: &str, schema: Value, settings: Map<String, Value>) -> Self {
        Self {
            name: Arc::from(name),
            state: Arc::new(Mutex::new(AdapterState {
                schema,
                settings,
                ..AdapterState::default()
            })),
        }
    }

    /// Make every load fail with `message` until cleared.
    pub fn set_load_failure(&self, message: Option<&str>) {
        lock(&self.state).load_failure = message.map(str::to_string);
    }

    /// Make every save fail with `message` until cleared.
    pub fn set_save_failure(&self, message: Option<&str>) {
        lock(&self.state).save_failure = message.map(str::to_string);
    }

    /// Replace the stored settings, as another writer would.
    pub fn replace_settings(&self, settings: Map<String, Value>) {
        lock(&self.state).settings = settings;
    }

    pub fn settings(&self) -> Map<String, Value> {
        lock(&self.state).settings.clone()
    }

    pub fn schema_loads(&self) -> usize {
        lock(&self.state).schema_loads
    }

    pub fn save_count(&self) -> usize {
        lock(&self.state).saves
    }
}

#[async_trait]
impl SettingsAdapter for MemoryAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load_schema(&self) -> Result<Value, AdapterError> {
        let mut state = lock(&self.state);
        if let Some(message) = &state.load_failure {
            return Err(AdapterError::Rejected(message.clone()));
        }
        state.schema_loads += 1;
        Ok(state.schema.clone())
    }

    async fn load_settings(&self) -> Result<Map<String, Value>, AdapterError> {
        let state = lock(&self.state);
        if let Some(message) = &state.load_failure {
            return Err(AdapterError::Rejected(message.clone()));
        }
        Ok(state.settings.clone())
    }

    async fn save_settings(&self, next: &Map<String, Value>) -> Result<(), AdapterError> {
        let mut state = lock(&self.state);
        if let Some(message) = &state.save_failure {
            return Err(AdapterError::Rejected(message.clone()));
        }
        state.settings = next.clone();
        state.saves += 1;
        Ok(())
    }
}

#[derive(Debug)]
struct DocumentState<T> {
    value: T,
    read_failure: Option<String>,
    write_failure: Option<String>,
    writes: usize,
}

/// [`DocumentIo`] over a single in-memory value.
#[derive(Debug)]
pub struct MemoryDocument<T> {
    state: Arc<Mutex<DocumentState<T>>>,
}

impl<T> Clone for MemoryDocument<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone> MemoryDocument<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(DocumentState {
                value,
                read_failure: None,
                write_failure: None,
                writes: 0,
            })),
        }
    }

    pub fn value(&self) -> T {
        lock(&self.state).value.clone()
    }

    pub fn set_read_failure(&self, message: Option<&str>) {
        lock(&self.state).read_failure = message.map(str::to_string);
    }

    pub fn set_write_failure(&self, message: Option<&str>) {
        lock(&self.state).write_failure = message.map(str::to_string);
    }

    pub fn write_count(&self) -> usize {
        lock(&self.state).writes
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> DocumentIo<T> for MemoryDocument<T> {
    async fn read(&self) -> Result<T, AdapterError> {
        let state = lock(&self.state);
        match &state.read_failure {
            Some(message) => Err(AdapterError::Rejected(message.clone())),
            None => Ok(state.value.clone()),
        }
    }

    async fn write(&self, value: &T) -> Result<(), AdapterError> {
        let mut state = lock(&self.state);
        if let Some(message) = &state.write_failure {
            return Err(AdapterError::Rejected(message.clone()));
        }
        state.value = value.clone();
        state.writes += 1;
        Ok(())
    }
}
