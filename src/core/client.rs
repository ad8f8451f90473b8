use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::core::conversation::{Conversation, Session};
use crate::core::credentials::{load_token, CredentialStore};
use crate::core::dispatcher::{DispatchOutcome, MessageDispatcher};
use crate::core::identity::{self, Identity};
use crate::core::resumer::{ResumedSession, SessionResumer};
use crate::api::ProfileResponse;
use crate::core::service::{ChatService, ServiceError};
use crate::core::timeline::TimelineEntry;

/// Everything a front end needs to hold one conversation with the service.
pub struct ChatClient {
    service: Arc<dyn ChatService>,
    store: Arc<dyn CredentialStore>,
    conversation: Conversation,
    started: AtomicBool,
}

impl ChatClient {
    pub fn new(service: Arc<dyn ChatService>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            service,
            store,
            conversation: Conversation::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> &dyn ChatService {
        self.service.as_ref()
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub fn resumer(&self) -> SessionResumer<'_> {
        SessionResumer::new(self.service(), self.store(), &self.conversation)
    }

    pub fn dispatcher(&self) -> MessageDispatcher<'_> {
        MessageDispatcher::new(self.service(), self.store(), &self.conversation)
    }

    /// Resumes the conversation the first time it is called; later calls do nothing.
    pub async fn start(&self) -> Option<ResumedSession> {
        if self.started.swap(true, Ordering::SeqCst) {
            return None;
        }
        self.resume().await
    }

    /// Re-fetches the current session and replaces the timeline.
    pub async fn resume(&self) -> Option<ResumedSession> {
        self.resumer().resume().await
    }

    pub async fn send(&self, text: &str) -> DispatchOutcome {
        self.dispatcher().send(text).await
    }

    pub fn is_authenticated(&self) -> bool {
        load_token(self.store()).is_some()
    }

    /// Identity of the stored credential.
    ///
    /// A freshly resolved name replaces the cached fallback when they differ.
    /// If the token cannot be decoded the cached name is used instead.
    pub fn identity(&self) -> Option<Identity> {
        let token = load_token(self.store())?;
        let fallback = match self.store.display_name_fallback() {
            Ok(name) => name,
            Err(err) => {
                warn!(error = %err, "Could not read cached display name");
                None
            }
        };

        match identity::resolve(&token) {
            Some(identity) => {
                if fallback.as_deref() != Some(identity.display_name.as_str()) {
                    if let Err(err) = self.store.set_display_name_fallback(&identity.display_name) {
                        warn!(error = %err, "Could not cache display name");
                    }
                }
                Some(identity)
            }
            None => fallback.map(Identity::new),
        }
    }

    /// Asks the service who the stored credential belongs to.
    ///
    /// `Ok(None)` means no credential is stored and nothing was requested.
    pub async fn remote_profile(&self) -> Result<Option<ProfileResponse>, ServiceError> {
        let Some(token) = load_token(self.store()) else {
            return Ok(None);
        };
        self.service.profile(&token).await.map(Some)
    }

    pub fn session(&self) -> Session {
        self.conversation.session()
    }

    pub fn snapshot(&self) -> Vec<TimelineEntry> {
        self.conversation.snapshot()
    }

    /// Entries appended after `seq`, or all of them for `None`.
    pub fn entries_after(&self, seq: Option<u64>) -> Vec<TimelineEntry> {
        self.conversation.entries_after(seq)
    }

    /// Forgets the timeline and session, e.g. after signing out.
    pub fn reset(&self) {
        self.conversation.reset();
    }
}
