use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::core::message::{Delivery, Message, Origin};
use crate::core::timeline::{Timeline, TimelineEntry};

/// The conversation the service is currently tracking for this user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// A user message that has been appended and is waiting for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSend {
    pub seq: u64,
    /// Session id the message is being sent under.
    pub session_id: Option<i64>,
}

#[derive(Debug, Default)]
struct ConversationState {
    timeline: Timeline,
    session: Session,
}

/// Timeline and session guarded by one lock.
///
/// The lock is only taken for synchronous bookkeeping and is never held
/// across a network call.
#[derive(Debug, Default)]
pub struct Conversation {
    state: Mutex<ConversationState>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn session_id(&self) -> Option<i64> {
        self.lock().session.id
    }

    pub fn snapshot(&self) -> Vec<TimelineEntry> {
        self.lock().timeline.snapshot()
    }

    pub fn entries_after(&self, seq: Option<u64>) -> Vec<TimelineEntry> {
        self.lock().timeline.entries_after(seq)
    }

    pub fn len(&self) -> usize {
        self.lock().timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().timeline.is_empty()
    }

    /// Replaces history and session after a successful resume.
    pub fn load(&self, session_id: i64, session_name: Option<String>, messages: Vec<Message>) {
        let mut state = self.lock();
        state.timeline.replace_all(messages);
        state.session = Session {
            id: Some(session_id),
            name: session_name,
        };
    }

    /// Empties the timeline and forgets the session.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.timeline.clear();
        state.session = Session::default();
    }

    /// Optimistically appends a user message and records the session id it
    /// will be sent under.
    pub fn begin_send(&self, text: &str) -> PendingSend {
        let mut state = self.lock();
        let session_id = state.session.id;
        let seq = state.timeline.append_pending(Message::user(text));
        PendingSend { seq, session_id }
    }

    /// Records a successful exchange: appends the reply, marks the user
    /// message sent and adopts the session id the service returned.
    ///
    /// Returns the session id in effect afterwards.
    pub fn complete_send(&self, pending: PendingSend, reply: String, session_id: i64) -> Option<i64> {
        let mut state = self.lock();
        state
            .timeline
            .append_reply(Message::service(reply), Origin::Reply, pending.seq);
        state.timeline.mark_delivery(pending.seq, Delivery::Sent);

        if state.session.id == pending.session_id {
            if state.session.id != Some(session_id) {
                debug!(
                    previous = ?state.session.id,
                    session_id,
                    "Adopting session id from chat response"
                );
            }
            state.session.id = Some(session_id);
        } else {
            debug!(
                sent_under = ?pending.session_id,
                current = ?state.session.id,
                returned = session_id,
                "Ignoring session id from a reply sent under a replaced session"
            );
        }
        state.session.id
    }

    /// Records a failed exchange: appends the error notice and marks the user
    /// message failed. The session is left alone.
    pub fn fail_send(&self, pending: PendingSend, notice: String) {
        let mut state = self.lock();
        state
            .timeline
            .append_reply(Message::service(notice), Origin::Notice, pending.seq);
        state.timeline.mark_delivery(pending.seq, Delivery::Failed);
    }

    /// Appends a notice that is not tied to any sent message.
    pub fn push_notice(&self, notice: impl Into<String>) -> u64 {
        self.lock()
            .timeline
            .append(Message::service(notice), Origin::Notice)
    }
}
