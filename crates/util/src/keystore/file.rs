//! JSON settings file holding the API key.
//!
//! The file defaults to `~/.config/actrun/settings.json` on most platforms
//! and may be relocated with `ACTRUN_CONFIG_PATH`.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirs_next::config_dir;
use tracing::warn;

use super::{API_KEY_NAME, ApiKeyStore, StoreError};
use crate::expand_tilde;

/// Environment variable allowing callers to override the settings file path.
pub const CONFIG_PATH_ENV: &str = "ACTRUN_CONFIG_PATH";
/// Default filename for the JSON payload.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Thread-safe key-value settings file.
#[derive(Debug)]
pub struct FileKeyStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyStore {
    /// Open the store at the default (or env-overridden) location.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(default_settings_path())
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = load_entries(&path)?;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_locked(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl ApiKeyStore for FileKeyStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().expect("settings lock poisoned").get(API_KEY_NAME).cloned())
    }

    fn set(&self, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("settings lock poisoned");
        if value.is_empty() {
            entries.remove(API_KEY_NAME);
        } else {
            entries.insert(API_KEY_NAME.to_string(), value.to_string());
        }
        self.save_locked(&entries)
    }
}

fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("actrun")
        .join(SETTINGS_FILE_NAME)
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse settings file; starting empty"
                );
                Ok(BTreeMap::new())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(error) => Err(StoreError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_survives_reopening_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);

        let store = FileKeyStore::open(&path).expect("open store");
        assert_eq!(store.get().expect("read"), None);
        store.set("secret-key").expect("write");

        let reopened = FileKeyStore::open(&path).expect("reopen store");
        assert_eq!(reopened.get().expect("read"), Some("secret-key".to_string()));
    }

    #[test]
    fn empty_value_clears_the_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        let store = FileKeyStore::open(&path).expect("open store");
        store.set("secret-key").expect("write");
        store.set("").expect("clear");

        let reopened = FileKeyStore::open(&path).expect("reopen store");
        assert_eq!(reopened.get().expect("read"), None);
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{not json").expect("write corrupt file");
        let store = FileKeyStore::open(&path).expect("open store");
        assert_eq!(store.get().expect("read"), None);
    }

    #[test]
    fn env_override_selects_settings_path() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/actrun-test/settings.json"), || {
            assert_eq!(default_settings_path(), PathBuf::from("/tmp/actrun-test/settings.json"));
        });
    }
}
