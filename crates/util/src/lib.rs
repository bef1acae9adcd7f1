//! Utility helpers shared across the actrun crates.

pub mod keystore;
mod naming;
mod path_processing;
mod result_display;
mod text_processing;

pub use keystore::{API_KEY_NAME, ApiKeyStore, FileKeyStore, KeychainKeyStore, MemoryKeyStore, SecretsBackend, StoreError, open_api_key_store};
pub use naming::to_kebab_case;
pub use path_processing::expand_tilde;
pub use result_display::stringify_result;
pub use text_processing::redact_sensitive;
