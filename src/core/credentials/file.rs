use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::{CredentialStore, CredentialStoreError};
use crate::core::config::paths::project_dirs;
use crate::utils::atomic::write_atomically;

const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
}

/// Keeps credentials in a TOML file owned by the current user.
///
/// Every write replaces the whole file through a temporary file, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    guard: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Store at the platform data directory.
    pub fn open_default() -> Result<Self, CredentialStoreError> {
        let dirs = project_dirs().ok_or(CredentialStoreError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir().join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredCredentials, CredentialStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(StoredCredentials::default())
            }
            Err(source) => {
                return Err(CredentialStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        toml::from_str(&contents).map_err(|source| CredentialStoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, stored: &StoredCredentials) -> Result<(), CredentialStoreError> {
        let contents = toml::to_string_pretty(stored).map_err(CredentialStoreError::Serialize)?;
        write_atomically(&self.path, contents.as_bytes()).map_err(|source| {
            CredentialStoreError::Io {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn update<F>(&self, apply: F) -> Result<(), CredentialStoreError>
    where
        F: FnOnce(&mut StoredCredentials),
    {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stored = self.read()?;
        apply(&mut stored);
        self.write(&stored)
    }

    fn load(&self) -> Result<StoredCredentials, CredentialStoreError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.read()
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.load()?.access_token)
    }

    fn set_token(&self, token: &str) -> Result<(), CredentialStoreError> {
        self.update(|stored| stored.access_token = Some(token.to_string()))
    }

    fn display_name_fallback(&self) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.load()?.display_name)
    }

    fn set_display_name_fallback(&self, name: &str) -> Result<(), CredentialStoreError> {
        self.update(|stored| stored.display_name = Some(name.to_string()))
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CredentialStoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.toml"));
        assert_eq!(store.token().unwrap(), None);
        assert_eq!(store.display_name_fallback().unwrap(), None);
    }

    #[test]
    fn values_survive_a_new_store_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        let store = FileCredentialStore::new(&path);
        store.set_token("header.payload.signature").unwrap();
        store.set_display_name_fallback("alice").unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(
            reopened.token().unwrap().as_deref(),
            Some("header.payload.signature")
        );
        assert_eq!(
            reopened.display_name_fallback().unwrap().as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn writing_one_key_keeps_the_other() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.toml"));
        store.set_display_name_fallback("alice").unwrap();
        store.set_token("t1").unwrap();
        store.set_token("t2").unwrap();

        assert_eq!(store.token().unwrap().as_deref(), Some("t2"));
        assert_eq!(
            store.display_name_fallback().unwrap().as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn clear_removes_the_file_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.toml"));
        store.set_token("t").unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn corrupt_file_reports_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "access_token = [").unwrap();

        let store = FileCredentialStore::new(&path);
        let err = store.token().unwrap_err();
        assert!(matches!(err, CredentialStoreError::Parse { .. }));
        assert!(err.to_string().contains("credentials.toml"));
    }
}
