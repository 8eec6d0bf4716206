//! Preference stores backed by a JSON object.
//!
//! [`MemoryPreferences`] lives for one process. [`JsonFilePreferences`]
//! rewrites its file on every change so a preference set in one run is
//! seen by the next.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use thiserror::Error;

use capture_session_core::traits::preferences::PreferenceStore;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("preferences I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("preferences file is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

fn read_bool(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn read_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// In-memory [`PreferenceStore`].
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<Map<String, Value>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn bool(&self, key: &str) -> bool {
        read_bool(&self.values.lock(), key)
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.values.lock().insert(key.to_string(), Value::Bool(value));
    }

    fn string(&self, key: &str) -> Option<String> {
        read_string(&self.values.lock(), key)
    }

    fn set_string(&self, key: &str, value: &str) {
        self.values
            .lock()
            .insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// [`PreferenceStore`] persisted as a pretty-printed JSON object.
pub struct JsonFilePreferences {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFilePreferences {
    /// Loads `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        log::debug!("loaded {} preferences from {}", values.len(), path.display());
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, key: &str, value: Value) {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value);
        if let Err(e) = self.persist(&values) {
            log::error!("failed to write {}: {}", self.path.display(), e);
        }
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), PreferencesError> {
        let text = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn bool(&self, key: &str) -> bool {
        read_bool(&self.values.lock(), key)
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.update(key, Value::Bool(value));
    }

    fn string(&self, key: &str) -> Option<String> {
        read_string(&self.values.lock(), key)
    }

    fn set_string(&self, key: &str, value: &str) {
        self.update(key, Value::String(value.to_string()));
    }
}
