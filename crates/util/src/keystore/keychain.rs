use tracing::debug;

use super::{API_KEY_NAME, ApiKeyStore, StoreError};

static SERVICE: &str = "actrun";

/// Key store backed by the OS keychain.
#[derive(Debug, Clone)]
pub struct KeychainKeyStore {
    service: String,
}

impl KeychainKeyStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service, API_KEY_NAME).map_err(|e| StoreError::Keyring {
            name: API_KEY_NAME.to_string(),
            error: e.to_string(),
        })
    }
}

impl Default for KeychainKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiKeyStore for KeychainKeyStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Keyring {
                name: API_KEY_NAME.to_string(),
                error: e.to_string(),
            }),
        }
    }

    fn set(&self, value: &str) -> Result<(), StoreError> {
        let entry = self.entry()?;
        let outcome = if value.is_empty() {
            match entry.delete_credential() {
                Err(keyring::Error::NoEntry) => Ok(()),
                other => other,
            }
        } else {
            entry.set_password(value)
        };
        outcome.map_err(|e| StoreError::Keyring {
            name: API_KEY_NAME.to_string(),
            error: e.to_string(),
        })?;
        debug!("Stored API key in keychain");
        Ok(())
    }
}
