use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{CredentialStore, CredentialStoreError};

#[derive(Debug, Default)]
struct Slots {
    token: Option<String>,
    display_name: Option<String>,
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slots: Mutex<Slots>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        store.slots().token = Some(token.into());
        store
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.slots().token.clone())
    }

    fn set_token(&self, token: &str) -> Result<(), CredentialStoreError> {
        self.slots().token = Some(token.to_string());
        Ok(())
    }

    fn display_name_fallback(&self) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.slots().display_name.clone())
    }

    fn set_display_name_fallback(&self, name: &str) -> Result<(), CredentialStoreError> {
        self.slots().display_name = Some(name.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.slots() = Slots::default();
        Ok(())
    }
}
