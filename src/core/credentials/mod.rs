//! Persisted sign-in state.
//!
//! Two values survive restarts: the bearer token and the last display name
//! resolved from it. Both live behind [`CredentialStore`] so callers never
//! reach for a process-wide singleton and tests can swap in
//! [`MemoryCredentialStore`].

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing::warn;

use crate::core::config::data::path_display;
use crate::core::keyring::KeyringAccessError;

/// Storage key of the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key of the cached display name.
pub const DISPLAY_NAME_KEY: &str = "display_name";

pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Result<Option<String>, CredentialStoreError>;

    fn set_token(&self, token: &str) -> Result<(), CredentialStoreError>;

    fn display_name_fallback(&self) -> Result<Option<String>, CredentialStoreError>;

    fn set_display_name_fallback(&self, name: &str) -> Result<(), CredentialStoreError>;

    /// Removes both the token and the cached display name.
    fn clear(&self) -> Result<(), CredentialStoreError>;
}

/// The stored token, treating blank values and read failures as absent.
pub fn load_token(store: &dyn CredentialStore) -> Option<String> {
    match store.token() {
        Ok(Some(token)) if !token.trim().is_empty() => Some(token),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "Could not read stored credential");
            None
        }
    }
}

#[derive(Debug)]
pub enum CredentialStoreError {
    /// The credential file could not be read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The credential file exists but is not valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    Serialize(toml::ser::Error),

    /// No platform data directory could be determined.
    NoDataDir,

    Keyring(KeyringAccessError),
}

impl fmt::Display for CredentialStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialStoreError::Io { path, source } => write!(
                f,
                "Failed to access credentials at {}: {}",
                path_display(path),
                source
            ),
            CredentialStoreError::Parse { path, source } => write!(
                f,
                "Failed to parse credentials at {}: {}",
                path_display(path),
                source
            ),
            CredentialStoreError::Serialize(source) => {
                write!(f, "Failed to serialize credentials: {source}")
            }
            CredentialStoreError::NoDataDir => {
                write!(f, "Could not determine a data directory for credentials")
            }
            CredentialStoreError::Keyring(source) => write!(f, "Keyring error: {source}"),
        }
    }
}

impl StdError for CredentialStoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CredentialStoreError::Io { source, .. } => Some(source),
            CredentialStoreError::Parse { source, .. } => Some(source),
            CredentialStoreError::Serialize(source) => Some(source),
            CredentialStoreError::NoDataDir => None,
            CredentialStoreError::Keyring(source) => Some(source),
        }
    }
}

impl From<KeyringAccessError> for CredentialStoreError {
    fn from(err: KeyringAccessError) -> Self {
        CredentialStoreError::Keyring(err)
    }
}
