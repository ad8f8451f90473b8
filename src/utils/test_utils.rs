use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use tokio::sync::oneshot;

use crate::api::{
    ChatRequest, ChatResponse, Credentials, CurrentSessionResponse, LoginResponse,
    ProfileResponse, RegisterResponse,
};
use crate::core::message::Message;
use crate::core::service::{ChatService, ServiceError};

pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Builds an unsigned three-segment token carrying `payload`.
pub fn token_with_payload(payload: &serde_json::Value) -> String {
    let header = encode_segment(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = encode_segment(payload.to_string().as_bytes());
    format!("{header}.{body}.signature")
}

pub fn token_for(subject: &str) -> String {
    token_with_payload(&serde_json::json!({ "sub": subject, "type": "access" }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Login { username: String },
    Register { username: String },
    Profile { token: String },
    CurrentSession { token: String },
    Chat { token: String, request: ChatRequest },
}

struct ScriptedChat {
    result: Result<ChatResponse, ServiceError>,
    release: Option<oneshot::Receiver<()>>,
}

/// [`ChatService`] that answers from per-endpoint queues and records every call.
#[derive(Default)]
pub struct ScriptedService {
    calls: Mutex<Vec<RecordedCall>>,
    logins: Mutex<VecDeque<Result<LoginResponse, ServiceError>>>,
    registrations: Mutex<VecDeque<Result<RegisterResponse, ServiceError>>>,
    profiles: Mutex<VecDeque<Result<ProfileResponse, ServiceError>>>,
    sessions: Mutex<VecDeque<Result<CurrentSessionResponse, ServiceError>>>,
    chats: Mutex<VecDeque<ScriptedChat>>,
}

fn exhausted<T>(endpoint: &str) -> Result<T, ServiceError> {
    Err(ServiceError::Network(format!("no scripted response for {endpoint}")))
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn push_login(&self, result: Result<LoginResponse, ServiceError>) {
        self.logins.lock().unwrap().push_back(result);
    }

    pub fn push_register(&self, result: Result<RegisterResponse, ServiceError>) {
        self.registrations.lock().unwrap().push_back(result);
    }

    pub fn push_profile(&self, result: Result<ProfileResponse, ServiceError>) {
        self.profiles.lock().unwrap().push_back(result);
    }

    pub fn push_session(&self, result: Result<CurrentSessionResponse, ServiceError>) {
        self.sessions.lock().unwrap().push_back(result);
    }

    pub fn push_history(&self, session_id: i64, messages: Vec<Message>) {
        self.push_session(Ok(CurrentSessionResponse {
            session_id,
            session_name: Some("Current session".to_string()),
            messages,
        }));
    }

    pub fn push_chat(&self, result: Result<ChatResponse, ServiceError>) {
        self.chats.lock().unwrap().push_back(ScriptedChat {
            result,
            release: None,
        });
    }

    pub fn push_reply(&self, response: &str, session_id: i64) {
        self.push_chat(Ok(ChatResponse {
            response: response.to_string(),
            session_id,
        }));
    }

    /// Queues a chat result that is only delivered once the returned sender
    /// fires (or is dropped).
    pub fn push_gated_reply(&self, response: &str, session_id: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.chats.lock().unwrap().push_back(ScriptedChat {
            result: Ok(ChatResponse {
                response: response.to_string(),
                session_id,
            }),
            release: Some(rx),
        });
        tx
    }
}

#[async_trait]
impl ChatService for ScriptedService {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ServiceError> {
        self.record(RecordedCall::Login {
            username: credentials.username.clone(),
        });
        let next = self.logins.lock().unwrap().pop_front();
        next.unwrap_or_else(|| exhausted("login"))
    }

    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ServiceError> {
        self.record(RecordedCall::Register {
            username: credentials.username.clone(),
        });
        let next = self.registrations.lock().unwrap().pop_front();
        next.unwrap_or_else(|| exhausted("register"))
    }

    async fn profile(&self, token: &str) -> Result<ProfileResponse, ServiceError> {
        self.record(RecordedCall::Profile {
            token: token.to_string(),
        });
        let next = self.profiles.lock().unwrap().pop_front();
        next.unwrap_or_else(|| exhausted("profile"))
    }

    async fn current_session(&self, token: &str) -> Result<CurrentSessionResponse, ServiceError> {
        self.record(RecordedCall::CurrentSession {
            token: token.to_string(),
        });
        let next = self.sessions.lock().unwrap().pop_front();
        next.unwrap_or_else(|| exhausted("current session"))
    }

    async fn send_message(
        &self,
        token: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ServiceError> {
        self.record(RecordedCall::Chat {
            token: token.to_string(),
            request: request.clone(),
        });
        let next = self.chats.lock().unwrap().pop_front();
        let Some(scripted) = next else {
            return exhausted("chat");
        };
        if let Some(release) = scripted.release {
            let _ = release.await;
        }
        scripted.result
    }
}
