//! Request and response bodies exchanged with the Lilith service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::message::Message;

pub const LOGIN_ENDPOINT: &str = "login";
pub const REGISTER_ENDPOINT: &str = "register";
pub const PROFILE_ENDPOINT: &str = "api/me";
pub const CURRENT_SESSION_ENDPOINT: &str = "api/sessions/current";
pub const CHAT_ENDPOINT: &str = "api/chat";

/// Body of `/login` and `/register`.
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// keep passwords out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub username: String,
    pub id: i64,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSessionResponse {
    pub session_id: i64,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    /// Serialized as `null` when no session has been established yet.
    pub session_id: Option<i64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub session_id: i64,
}

/// Pulls a human-readable description out of an error body.
///
/// The service has been seen answering with `{"error": "..."}`,
/// `{"msg": "..."}` and `{"error": {"message": "..."}}`; all are accepted.
pub fn extract_error_description(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;

    let error = value.get("error").and_then(|error| match error {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map.get("message").and_then(Value::as_str),
        _ => None,
    });
    let msg = value.get("msg").and_then(Value::as_str);

    // a blank `error` still lets `msg` through
    let description = [error, msg]
        .into_iter()
        .flatten()
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|collapsed| !collapsed.is_empty());
    description
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serializes_missing_session_as_null() {
        let request = ChatRequest {
            message: "Hello".to_string(),
            session_id: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "message": "Hello", "sessionId": null })
        );
    }

    #[test]
    fn current_session_tolerates_missing_optional_fields() {
        let body = r#"{"sessionId": 5}"#;
        let parsed: CurrentSessionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.session_id, 5);
        assert!(parsed.messages.is_empty());
        assert_eq!(parsed.session_name, None);
    }

    #[test]
    fn current_session_preserves_message_order() {
        let body = r#"{
            "sessionId": 9,
            "sessionName": "Current session",
            "messages": [
                {"text": "hello", "isUser": true, "timestamp": "2024-05-01T10:00:00"},
                {"text": "Lilith: hi", "isUser": false, "timestamp": "2024-05-01T10:00:01"}
            ]
        }"#;
        let parsed: CurrentSessionResponse = serde_json::from_str(body).unwrap();
        let texts: Vec<&str> = parsed.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "Lilith: hi"]);
        assert!(parsed.messages[0].is_user);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("alice", "hunter22"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter22"));
    }

    #[test]
    fn error_description_accepts_each_observed_shape() {
        assert_eq!(
            extract_error_description(r#"{"error": "rate limited"}"#).as_deref(),
            Some("rate limited")
        );
        assert_eq!(
            extract_error_description(r#"{"msg": "Token has expired"}"#).as_deref(),
            Some("Token has expired")
        );
        assert_eq!(
            extract_error_description(r#"{"error": {"message": "bad\n  session"}}"#).as_deref(),
            Some("bad session")
        );
        assert_eq!(
            extract_error_description(r#"{"error": "", "msg": "Token has expired"}"#).as_deref(),
            Some("Token has expired")
        );
        assert_eq!(
            extract_error_description(r#"{"error": "  ", "msg": ""}"#),
            None
        );
    }

    #[test]
    fn error_description_prefers_error_over_msg() {
        assert_eq!(
            extract_error_description(r#"{"msg": "second", "error": "first"}"#).as_deref(),
            Some("first")
        );
    }

    #[test]
    fn error_description_is_none_for_unusable_bodies() {
        assert_eq!(extract_error_description(""), None);
        assert_eq!(extract_error_description("<html>502</html>"), None);
        assert_eq!(extract_error_description(r#"{"error": ""}"#), None);
        assert_eq!(extract_error_description(r#"{"error": 12}"#), None);
        assert_eq!(extract_error_description(r#"["error"]"#), None);
    }
}
