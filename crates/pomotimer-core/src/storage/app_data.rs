//! The persisted application document and its fail-soft store adapter.

use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::history::HistoryEntry;

/// Key under which the whole document is stored.
pub const APP_DATA_KEY: &str = "appData";

/// Top-level persisted document.
///
/// Fields this version does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Result of reading the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// Nothing stored yet (or the backend could not be read).
    Missing,
    Loaded(AppData),
    /// A JSON object whose `history` is absent-shaped or partly invalid.
    /// Holds what could be salvaged; the stored value is left alone.
    Malformed(AppData),
    /// The stored text is not a JSON object at all.
    Corrupt,
}

impl ReadOutcome {
    /// The loaded or salvaged document, or the default one.
    pub fn unwrap_or_default(self) -> AppData {
        match self {
            ReadOutcome::Loaded(data) | ReadOutcome::Malformed(data) => data,
            ReadOutcome::Missing | ReadOutcome::Corrupt => AppData::default(),
        }
    }
}

/// Keep every top-level field and every history element that parses.
fn salvage(mut fields: serde_json::Map<String, serde_json::Value>) -> AppData {
    let history = match fields.remove("history") {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<HistoryEntry>(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    AppData {
        history,
        extra: fields,
    }
}

/// Reads and writes [`AppData`] as one JSON blob.
///
/// Failures are logged and reported through return values; nothing here
/// returns an error to the caller.
pub struct AppDataStore<S> {
    store: S,
}

impl<S: KeyValueStore> AppDataStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn read(&self) -> ReadOutcome {
        let raw = match self.store.get(APP_DATA_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ReadOutcome::Missing,
            Err(e) => {
                tracing::error!(error = %e, key = APP_DATA_KEY, "failed to read app data");
                return ReadOutcome::Missing;
            }
        };

        let fields = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Object(fields)) => fields,
            Ok(_) => {
                tracing::error!(key = APP_DATA_KEY, "stored app data is not a JSON object");
                return ReadOutcome::Corrupt;
            }
            Err(e) => {
                tracing::error!(error = %e, key = APP_DATA_KEY, "stored app data is not valid JSON");
                return ReadOutcome::Corrupt;
            }
        };

        match serde_json::from_value::<AppData>(serde_json::Value::Object(fields.clone())) {
            Ok(data) => ReadOutcome::Loaded(data),
            Err(e) => {
                tracing::warn!(error = %e, key = APP_DATA_KEY, "stored history is malformed, salvaging");
                ReadOutcome::Malformed(salvage(fields))
            }
        }
    }

    /// Serialize and store `data`. Returns `false` when nothing was written.
    pub fn write(&self, data: &AppData) -> bool {
        let raw = match serde_json::to_string(data) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize app data");
                return false;
            }
        };

        match self.store.set(APP_DATA_KEY, &raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, key = APP_DATA_KEY, "failed to write app data");
                false
            }
        }
    }

    /// Make sure a document is stored, writing the default if needed.
    ///
    /// Only a missing or unparseable value is replaced. A malformed object
    /// is returned salvaged and rewritten on the next write.
    pub fn ensure_initialized(&self) -> AppData {
        match self.read() {
            ReadOutcome::Loaded(data) | ReadOutcome::Malformed(data) => data,
            outcome => {
                if outcome == ReadOutcome::Corrupt {
                    tracing::warn!("replacing unreadable app data with defaults");
                }
                let data = AppData::default();
                self.write(&data);
                data
            }
        }
    }
}
