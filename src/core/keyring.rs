use std::error::Error;
use std::fmt;

use keyring::Entry;

use crate::core::credentials::{
    CredentialStore, CredentialStoreError, ACCESS_TOKEN_KEY, DISPLAY_NAME_KEY,
};

const KEYRING_SERVICE: &str = "lilith";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors indicate that the credential backend was
/// temporarily unavailable (for example when the keychain service is
/// locked or inaccessible). Permanent errors surface the underlying
/// cause directly so callers can report them to the user.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

/// Keeps credentials in the platform keyring under the `lilith` service.
#[derive(Debug, Default)]
pub struct KeyringCredentialStore;

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(key: &str) -> Result<Entry, KeyringAccessError> {
        Entry::new(KEYRING_SERVICE, key).map_err(KeyringAccessError::from)
    }

    fn read(key: &str) -> Result<Option<String>, CredentialStoreError> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(KeyringAccessError::from(err).into()),
        }
    }

    fn write(key: &str, value: &str) -> Result<(), CredentialStoreError> {
        Self::entry(key)?
            .set_password(value)
            .map_err(|err| KeyringAccessError::from(err).into())
    }

    fn remove(key: &str) -> Result<(), CredentialStoreError> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(KeyringAccessError::from(err).into()),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn token(&self) -> Result<Option<String>, CredentialStoreError> {
        Self::read(ACCESS_TOKEN_KEY)
    }

    fn set_token(&self, token: &str) -> Result<(), CredentialStoreError> {
        Self::write(ACCESS_TOKEN_KEY, token)
    }

    fn display_name_fallback(&self) -> Result<Option<String>, CredentialStoreError> {
        Self::read(DISPLAY_NAME_KEY)
    }

    fn set_display_name_fallback(&self, name: &str) -> Result<(), CredentialStoreError> {
        Self::write(DISPLAY_NAME_KEY, name)
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        Self::remove(ACCESS_TOKEN_KEY)?;
        Self::remove(DISPLAY_NAME_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_outages_are_recoverable() {
        let err = KeyringAccessError::from(keyring::Error::NoStorageAccess(
            "locked".to_string().into(),
        ));
        assert!(err.is_recoverable());
    }

    #[test]
    fn other_failures_are_permanent() {
        let err = KeyringAccessError::from(keyring::Error::TooLong("user".to_string(), 255));
        assert!(!err.is_recoverable());
        assert!(err.source().is_some());
    }
}
