use tracing::{debug, warn};

use crate::core::conversation::Conversation;
use crate::core::credentials::{load_token, CredentialStore};
use crate::core::message::Message;
use crate::core::service::ChatService;

/// Conversation state fetched from the service on start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumedSession {
    pub session_id: i64,
    pub session_name: Option<String>,
    pub messages: Vec<Message>,
}

/// Loads the active conversation for the signed-in user.
pub struct SessionResumer<'a> {
    service: &'a dyn ChatService,
    store: &'a dyn CredentialStore,
    conversation: &'a Conversation,
}

impl<'a> SessionResumer<'a> {
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

    /// Fetches the current session and replaces the timeline with its history.
    ///
    /// Without a stored credential nothing is requested and nothing changes.
    /// Any failure leaves an empty timeline and no session; it is logged and
    /// never retried.
    pub async fn resume(&self) -> Option<ResumedSession> {
        let Some(token) = load_token(self.store) else {
            debug!("No stored credential; skipping resume");
            return None;
        };

        match self.service.current_session(&token).await {
            Ok(response) => {
                debug!(
                    session_id = response.session_id,
                    messages = response.messages.len(),
                    "Resumed conversation"
                );
                self.conversation.load(
                    response.session_id,
                    response.session_name.clone(),
                    response.messages.clone(),
                );
                Some(ResumedSession {
                    session_id: response.session_id,
                    session_name: response.session_name,
                    messages: response.messages,
                })
            }
            Err(err) => {
                warn!(error = %err, "Could not resume conversation");
                self.conversation.reset();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::MemoryCredentialStore;
    use crate::core::message::Origin;
    use crate::core::service::ServiceError;
    use crate::utils::test_utils::{token_for, RecordedCall, ScriptedService};

    #[tokio::test]
    async fn no_credential_means_no_request_and_empty_timeline() {
        let service = ScriptedService::new();
        service.push_history(1, vec![Message::user("never seen")]);
        let store = MemoryCredentialStore::new();
        let conversation = Conversation::new();

        let resumed = SessionResumer::new(&service, &store, &conversation)
            .resume()
            .await;

        assert_eq!(resumed, None);
        assert_eq!(service.call_count(), 0);
        assert!(conversation.is_empty());
        assert_eq!(conversation.session_id(), None);
    }

    #[tokio::test]
    async fn blank_credential_counts_as_absent() {
        let service = ScriptedService::new();
        let store = MemoryCredentialStore::with_token("   ");
        let conversation = Conversation::new();

        assert_eq!(
            SessionResumer::new(&service, &store, &conversation)
                .resume()
                .await,
            None
        );
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn success_replaces_timeline_in_order_and_sets_session() {
        let service = ScriptedService::new();
        let history = vec![
            Message::user("hello").with_timestamp("2024-05-01T10:00:00"),
            Message::service("Lilith: hi").with_timestamp("2024-05-01T10:00:01"),
            Message::user("how are you?"),
        ];
        service.push_history(17, history.clone());
        let token = token_for("alice");
        let store = MemoryCredentialStore::with_token(token.clone());
        let conversation = Conversation::new();
        conversation.push_notice("stale notice");

        let resumed = SessionResumer::new(&service, &store, &conversation)
            .resume()
            .await
            .expect("resume should succeed");

        assert_eq!(resumed.session_id, 17);
        assert_eq!(conversation.session_id(), Some(17));
        let entries = conversation.snapshot();
        let messages: Vec<Message> = entries.iter().map(|entry| entry.message.clone()).collect();
        assert_eq!(messages, history);
        assert!(entries.iter().all(|entry| entry.origin == Origin::Resumed));
        assert_eq!(service.calls(), vec![RecordedCall::CurrentSession { token }]);
    }

    #[tokio::test]
    async fn failure_leaves_empty_timeline_and_no_session() {
        let service = ScriptedService::new();
        service.push_session(Err(ServiceError::status(500, None)));
        let store = MemoryCredentialStore::with_token(token_for("alice"));
        let conversation = Conversation::new();
        conversation.push_notice("stale");

        let resumed = SessionResumer::new(&service, &store, &conversation)
            .resume()
            .await;

        assert_eq!(resumed, None);
        assert!(conversation.is_empty());
        assert_eq!(conversation.session_id(), None);
        // exactly one attempt, no retry
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn resuming_again_refetches_and_replaces() {
        let service = ScriptedService::new();
        service.push_history(1, vec![Message::user("first")]);
        service.push_history(2, vec![Message::user("second"), Message::service("reply")]);
        let store = MemoryCredentialStore::with_token(token_for("alice"));
        let conversation = Conversation::new();
        let resumer = SessionResumer::new(&service, &store, &conversation);

        resumer.resume().await.expect("first resume");
        resumer.resume().await.expect("second resume");

        assert_eq!(conversation.session_id(), Some(2));
        assert_eq!(conversation.len(), 2);
        assert_eq!(service.call_count(), 2);
    }
}
