mod app_data;
mod config;
pub mod database;

pub use app_data::{AppData, AppDataStore, ReadOutcome, APP_DATA_KEY};
pub use config::{Config, ScheduleConfig};
pub use database::SqliteStore;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

/// Returns the data directory, creating it if needed.
///
/// `POMOTIMER_DATA_DIR` wins when set. Otherwise `~/.config/pomotimer[-dev]/`
/// based on POMOTIMER_ENV (set POMOTIMER_ENV=dev for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("POMOTIMER_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotimer-dev")
            } else {
                base_dir.join("pomotimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// A string-valued key-value store with last-write-wins single-key sets.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Locked)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Locked)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
