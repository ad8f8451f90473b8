use tracing::{debug, warn};

use crate::api::ChatRequest;
use crate::core::conversation::Conversation;
use crate::core::credentials::{load_token, CredentialStore};
use crate::core::service::{ChatService, ServiceError};

pub const UNAUTHENTICATED_NOTICE: &str = "Error: you are not signed in. Please sign in.";
pub const SEND_FAILED_FALLBACK: &str = "failed to send message";
pub const SESSION_EXPIRED_FALLBACK: &str = "your session has expired, please sign in again";

/// What a call to [`MessageDispatcher::send`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The input was blank; nothing happened.
    Ignored,
    /// No credential was stored; a notice was appended and nothing was sent.
    Unauthenticated,
    /// The service replied. Carries the session id in effect afterwards.
    Delivered { session_id: Option<i64> },
    /// The request failed; an error notice was appended.
    Failed { description: String },
}

/// Sends user messages and reconciles the timeline with the replies.
pub struct MessageDispatcher<'a> {
    service: &'a dyn ChatService,
    store: &'a dyn CredentialStore,
    conversation: &'a Conversation,
}

impl<'a> MessageDispatcher<'a> {
    pub fn new(
        service: &'a dyn ChatService,
        store: &'a dyn CredentialStore,
        conversation: &'a Conversation,
    ) -> Self {
        Self {
            service,
            store,
            conversation,
        }
    }

    /// Appends `text` immediately, sends it under the current session id and
    /// appends the reply (or an error notice) once the service answers.
    pub async fn send(&self, text: &str) -> DispatchOutcome {
        if text.trim().is_empty() {
            return DispatchOutcome::Ignored;
        }

        let Some(token) = load_token(self.store) else {
            self.conversation.push_notice(UNAUTHENTICATED_NOTICE);
            return DispatchOutcome::Unauthenticated;
        };

        let pending = self.conversation.begin_send(text);
        let request = ChatRequest {
            message: text.to_string(),
            session_id: pending.session_id,
        };
        debug!(seq = pending.seq, session_id = ?pending.session_id, "Sending chat message");

        match self.service.send_message(&token, &request).await {
            Ok(reply) => {
                let session_id =
                    self.conversation
                        .complete_send(pending, reply.response, reply.session_id);
                DispatchOutcome::Delivered { session_id }
            }
            Err(err) => {
                warn!(seq = pending.seq, error = %err, "Chat message failed");
                let description = failure_description(&err);
                self.conversation
                    .fail_send(pending, format!("Error: {description}"));
                DispatchOutcome::Failed { description }
            }
        }
    }
}

/// Text shown for a failed send: the service's own words when it gave any.
pub fn failure_description(err: &ServiceError) -> String {
    match err.description() {
        Some(description) => description.to_string(),
        None if err.is_unauthorized() => SESSION_EXPIRED_FALLBACK.to_string(),
        None => SEND_FAILED_FALLBACK.to_string(),
    }
}
