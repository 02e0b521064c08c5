//! Settings store adapters
//!
//! The JSON file keeps every key it does not understand so the wallet's own
//! settings survive supervisor writes.

use crate::domain::WipeRecord;
use crate::error::StoreError;
use crate::ports::SettingsStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use wallet_ipc::Chain;

/// Settings document layout
///
/// ```json
/// { "chain": "test", "config": { "isMining": true }, "lastWipe": { ... } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_wipe: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl SettingsDocument {
    fn chain(&self) -> Option<String> {
        self.chain.as_ref().and_then(Value::as_str).map(str::to_string)
    }

    fn mining_enabled(&self) -> bool {
        self.config
            .as_ref()
            .and_then(|config| config.get("isMining"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn last_wipe(&self) -> Option<WipeRecord> {
        let value = self.last_wipe.clone()?;
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(error = %err, "Ignoring malformed wipe record");
                None
            }
        }
    }
}

/// Settings persisted as a JSON file
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<SettingsDocument>,
}

impl JsonFileStore {
    /// Open the file, treating a missing or malformed one as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(document) => document,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Settings file malformed, starting empty");
                    SettingsDocument::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file yet");
                SettingsDocument::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut SettingsDocument),
    {
        let mut document = self.document.lock();
        mutate(&mut document);
        let encoded = serde_json::to_string_pretty(&*document)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encoded).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsStore for JsonFileStore {
    fn chain(&self) -> Option<String> {
        self.document.lock().chain()
    }

    fn set_chain(&self, chain: Chain) -> Result<(), StoreError> {
        self.update(|document| document.chain = Some(Value::String(chain.as_str().to_string())))
    }

    fn mining_enabled(&self) -> bool {
        self.document.lock().mining_enabled()
    }

    fn last_wipe(&self) -> Option<WipeRecord> {
        self.document.lock().last_wipe()
    }

    fn record_wipe(&self, record: &WipeRecord) -> Result<(), StoreError> {
        let value = serde_json::to_value(record)?;
        self.update(|document| document.last_wipe = Some(value))
    }
}

/// Settings kept in memory; clones share state
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    document: Arc<Mutex<SettingsDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a raw chain value.
    pub fn with_chain(chain: &str) -> Self {
        let store = Self::new();
        store.document.lock().chain = Some(Value::String(chain.to_string()));
        store
    }

    pub fn set_mining_enabled(&self, enabled: bool) {
        self.document
            .lock()
            .config
            .get_or_insert_with(Map::new)
            .insert("isMining".to_string(), Value::Bool(enabled));
    }

    pub fn document(&self) -> SettingsDocument {
        self.document.lock().clone()
    }
}

impl SettingsStore for InMemoryStore {
    fn chain(&self) -> Option<String> {
        self.document.lock().chain()
    }

    fn set_chain(&self, chain: Chain) -> Result<(), StoreError> {
        self.document.lock().chain = Some(Value::String(chain.as_str().to_string()));
        Ok(())
    }

    fn mining_enabled(&self) -> bool {
        self.document.lock().mining_enabled()
    }

    fn last_wipe(&self) -> Option<WipeRecord> {
        self.document.lock().last_wipe()
    }

    fn record_wipe(&self, record: &WipeRecord) -> Result<(), StoreError> {
        let value = serde_json::to_value(record)?;
        self.document.lock().last_wipe = Some(value);
        Ok(())
    }
}
