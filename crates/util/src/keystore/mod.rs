//! Persistent storage for the action server API key.
//!
//! The key lives under the fixed name [`API_KEY_NAME`] in one of three
//! backends chosen through `ACTRUN_SECRETS_BACKEND`:
//!
//! - `keychain`: the OS keychain via `keyring` (default on macOS and Windows)
//! - `file`: a JSON settings file in the user config directory (default
//!   elsewhere, since the Linux kernel keyring is cleared on reboot)
//! - `memory`: process-local, used by tests and as a fallback

mod file;
mod keychain;
mod memory;

use std::fmt::Debug;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

pub use file::FileKeyStore;
pub use keychain::KeychainKeyStore;
pub use memory::MemoryKeyStore;

/// Fixed key under which the API key is stored.
pub const API_KEY_NAME: &str = "api-key";
/// Environment variable used to select the secret storage backend.
pub const SECRETS_BACKEND_ENV_VAR: &str = "ACTRUN_SECRETS_BACKEND";

/// Get/set capability for the single persisted API key value.
pub trait ApiKeyStore: Send + Sync + Debug {
    /// Returns the stored key, or `None` when nothing was saved yet.
    fn get(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the stored key. An empty value clears it.
    fn set(&self, value: &str) -> Result<(), StoreError>;

    /// Stored key or an empty string; failures are logged and treated as empty.
    fn get_or_empty(&self) -> String {
        match self.get() {
            Ok(value) => value.unwrap_or_default(),
            Err(error) => {
                warn!(%error, "failed to read stored API key");
                String::new()
            }
        }
    }
}

/// Secret storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretsBackend {
    Keychain,
    File,
    Memory,
}

impl SecretsBackend {
    /// Backend used when nothing is configured: a store that survives restarts.
    pub const fn platform_default() -> Self {
        if cfg!(any(target_os = "macos", target_os = "windows")) {
            Self::Keychain
        } else {
            Self::File
        }
    }

    fn from_env_var(raw: Option<String>) -> Self {
        match raw.unwrap_or_default().trim().to_ascii_lowercase().as_str() {
            "keychain" => Self::Keychain,
            "file" => Self::File,
            "memory" => Self::Memory,
            _ => Self::platform_default(),
        }
    }

    /// Determine the configured backend.
    pub fn from_env() -> Self {
        Self::from_env_var(std::env::var(SECRETS_BACKEND_ENV_VAR).ok())
    }
}

/// Open the API key store for the configured backend.
///
/// A file store that cannot be loaded degrades to an in-memory store so the
/// UI stays usable.
pub fn open_api_key_store(backend: SecretsBackend) -> Arc<dyn ApiKeyStore> {
    match backend {
        SecretsBackend::Keychain => Arc::new(KeychainKeyStore::new()),
        SecretsBackend::Memory => Arc::new(MemoryKeyStore::default()),
        SecretsBackend::File => match FileKeyStore::open_default() {
            Ok(store) => Arc::new(store),
            Err(error) => {
                warn!(%error, "failed to open settings file; API key will not persist");
                Arc::new(MemoryKeyStore::default())
            }
        },
    }
}

/// Errors raised by API key stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("keyring error for {name}: {error}")]
    Keyring { name: String, error: String },

    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
