//! Append-only conversation timeline.
//!
//! Entries are numbered with a local sequence number that keeps increasing
//! for the lifetime of the timeline, including across [`Timeline::replace_all`].
//! Completions that arrive after a replace therefore cannot address entries
//! that were appended later.

use crate::core::message::{Delivery, Message, Origin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub seq: u64,
    pub message: Message,
    pub origin: Origin,
    pub delivery: Option<Delivery>,
    /// Sequence number of the user message this entry answers.
    pub reply_to: Option<u64>,
}

impl TimelineEntry {
    pub fn is_user(&self) -> bool {
        self.message.is_user
    }

    pub fn text(&self) -> &str {
        &self.message.text
    }
}

#[derive(Debug, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    next_seq: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its sequence number.
    pub fn append(&mut self, message: Message, origin: Origin) -> u64 {
        self.push(message, origin, None, None)
    }

    /// Appends a user message awaiting delivery.
    pub fn append_pending(&mut self, message: Message) -> u64 {
        self.push(message, Origin::Local, Some(Delivery::Pending), None)
    }

    /// Appends a reply or notice attributed to the user message `reply_to`.
    pub fn append_reply(&mut self, message: Message, origin: Origin, reply_to: u64) -> u64 {
        self.push(message, origin, None, Some(reply_to))
    }

    fn push(
        &mut self,
        message: Message,
        origin: Origin,
        delivery: Option<Delivery>,
        reply_to: Option<u64>,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(TimelineEntry {
            seq,
            message,
            origin,
            delivery,
            reply_to,
        });
        seq
    }

    /// Discards every entry and loads `messages` in order as resumed history.
    pub fn replace_all<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        let mut next_seq = self.next_seq;
        let entries = messages
            .into_iter()
            .map(|message| {
                let seq = next_seq;
                next_seq += 1;
                TimelineEntry {
                    seq,
                    message,
                    origin: Origin::Resumed,
                    delivery: None,
                    reply_to: None,
                }
            })
            .collect();
        self.entries = entries;
        self.next_seq = next_seq;
    }

    pub fn clear(&mut self) {
        self.replace_all(std::iter::empty());
    }

    /// Updates the delivery state of a locally sent message.
    ///
    /// Returns false when `seq` is no longer present or never carried a
    /// delivery state.
    pub fn mark_delivery(&mut self, seq: u64, delivery: Delivery) -> bool {
        match self.position(seq) {
            Some(index) => {
                let entry = &mut self.entries[index];
                if entry.delivery.is_none() {
                    return false;
                }
                entry.delivery = Some(delivery);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, seq: u64) -> Option<&TimelineEntry> {
        self.position(seq).map(|index| &self.entries[index])
    }

    fn position(&self, seq: u64) -> Option<usize> {
        // seq is strictly increasing along the vector
        self.entries.binary_search_by_key(&seq, |entry| entry.seq).ok()
    }

    pub fn snapshot(&self) -> Vec<TimelineEntry> {
        self.entries.clone()
    }

    pub fn entries_after(&self, seq: Option<u64>) -> Vec<TimelineEntry> {
        match seq {
            None => self.snapshot(),
            Some(seq) => self
                .entries
                .iter()
                .filter(|entry| entry.seq > seq)
                .cloned()
                .collect(),
        }
    }

    pub fn last(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
