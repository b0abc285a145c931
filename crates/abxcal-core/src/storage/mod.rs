mod config;
pub mod database;

pub use config::{Config, LoggingConfig, SchedulingConfig};
pub use database::{MemoryStore, SqliteStore};

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, Result, StorageError};

/// Key under which the confirmed event collection is stored.
pub const EVENTS_KEY: &str = "calendar-events";
/// Key under which contacts are stored.
pub const CONTACTS_KEY: &str = "contacts";
/// Key under which antibiotics are stored.
pub const ANTIBIOTICS_KEY: &str = "antibiotics";

/// Returns the data directory, creating it if needed.
///
/// Resolution order:
/// 1. `ABXCAL_DATA_DIR`, used verbatim.
/// 2. `~/.config/abxcal-dev/` when `ABXCAL_ENV=dev`.
/// 3. `~/.config/abxcal/`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("ABXCAL_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("ABXCAL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("abxcal-dev")
            } else {
                base_dir.join("abxcal")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Durable load/save-by-key interface.
///
/// Values are opaque strings; the typed helpers encode them as JSON. Writes
/// are last-write-wins.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    fn load_raw(&self, key: &str) -> Result<Option<String>>;

    /// Replace the raw value stored under `key`.
    fn save_raw(&mut self, key: &str, value: &str) -> Result<()>;

    /// Decode the JSON value under `key`, falling back to `default` when the
    /// key is absent or the payload cannot be read.
    fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T
    where
        Self: Sized,
    {
        match self.load_json(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to load stored value, using default");
                default
            }
        }
    }

    /// Decode the JSON value under `key`.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        let Some(raw) = self.load_raw(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    /// Encode `value` as JSON and store it under `key`.
    fn save_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.save_raw(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        (**self).load_raw(key)
    }

    fn save_raw(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).save_raw(key, value)
    }
}
