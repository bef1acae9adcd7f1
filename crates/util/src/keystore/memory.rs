use std::sync::Mutex;

use super::{ApiKeyStore, StoreError};

/// Process-local key store.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    value: Mutex<Option<String>>,
}

impl MemoryKeyStore {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl ApiKeyStore for MemoryKeyStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.value.lock().expect("key store lock poisoned").clone())
    }

    fn set(&self, value: &str) -> Result<(), StoreError> {
        let mut slot = self.value.lock().expect("key store lock poisoned");
        *slot = if value.is_empty() { None } else { Some(value.to_string()) };
        Ok(())
    }
}
