use serde::{Deserialize, Serialize};

/// A single chat message as the service and the timeline see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub text: String,
    pub is_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    pub fn new(text: impl Into<String>, is_user: bool) -> Self {
        Self {
            text: text.into(),
            is_user,
            timestamp: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    pub fn service(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Where a timeline entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Loaded from the service's stored history on resume.
    Resumed,
    /// Typed by the user in this client.
    Local,
    /// A reply returned by the chat endpoint.
    Reply,
    /// Error text synthesized locally; never sent to or received from the service.
    Notice,
}

impl Origin {
    pub fn is_notice(self) -> bool {
        self == Origin::Notice
    }
}

/// Delivery state of a user message sent from this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delivery {
    Pending,
    Sent,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_camel_case_and_skips_missing_timestamp() {
        let json = serde_json::to_value(Message::user("Hello")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "Hello", "isUser": true }));
    }

    #[test]
    fn message_deserializes_without_timestamp() {
        let message: Message =
            serde_json::from_str(r#"{"text":"Hi","isUser":false}"#).unwrap();
        assert_eq!(message, Message::service("Hi"));
    }

    #[test]
    fn message_keeps_service_timestamp_verbatim() {
        let message: Message = serde_json::from_str(
            r#"{"text":"Hi","isUser":false,"timestamp":"2024-05-01T10:00:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(
            message.timestamp.as_deref(),
            Some("2024-05-01T10:00:00.123456")
        );
    }

    #[test]
    fn only_notices_report_as_notices() {
        assert!(Origin::Notice.is_notice());
        assert!(!Origin::Reply.is_notice());
        assert!(!Origin::Resumed.is_notice());
    }
}
