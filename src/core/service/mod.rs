//! Remote service boundary.
//!
//! [`ChatService`] is the seam between the conversation core and the
//! network. [`HttpChatService`] talks to the real service; tests script
//! their own implementation.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{
    extract_error_description, ChatRequest, ChatResponse, Credentials, CurrentSessionResponse,
    LoginResponse, ProfileResponse, RegisterResponse, CHAT_ENDPOINT, CURRENT_SESSION_ENDPOINT,
    LOGIN_ENDPOINT, PROFILE_ENDPOINT, REGISTER_ENDPOINT,
};
use crate::utils::url::{construct_api_url, normalize_base_url};


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never produced a response (connection refused, timeout, ...).
    Network(String),
    /// The service answered with a non-success status.
    Status {
        status: u16,
        /// Description taken from the error body, when it carried one.
        description: Option<String>,
    },
    /// The service answered successfully but the body had an unexpected shape.
    Decode(String),
}

impl ServiceError {
    pub fn status(status: u16, description: Option<&str>) -> Self {
        ServiceError::Status {
            status,
            description: description.map(str::to_string),
        }
    }

    /// Text supplied by the service itself, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            ServiceError::Status { description, .. } => description.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED.as_u16())
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Network(message) => write!(f, "Could not reach the service: {message}"),
            ServiceError::Status {
                status,
                description: Some(description),
            } => write!(f, "Service responded with {status}: {description}"),
            ServiceError::Status {
                status,
                description: None,
            } => write!(f, "Service responded with {status}"),
            ServiceError::Decode(message) => {
                write!(f, "Unexpected response from the service: {message}")
            }
        }
    }
}

impl Error for ServiceError {}

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ServiceError>;

    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ServiceError>;

    async fn profile(&self, token: &str) -> Result<ProfileResponse, ServiceError>;

    async fn current_session(&self, token: &str) -> Result<CurrentSessionResponse, ServiceError>;

    async fn send_message(
        &self,
        token: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ServiceError>;
}

/// [`ChatService`] over HTTP with bearer authentication.
#[derive(Clone, Debug)]
pub struct HttpChatService {
    client: Client,
    base_url: String,
}

impl HttpChatService {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        construct_api_url(&self.base_url, endpoint)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|err| ServiceError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ServiceError::Network(err.to_string()))?;

        if !status.is_success() {
            debug!(endpoint, status = status.as_u16(), "Service request rejected");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                description: extract_error_description(&body),
            });
        }

        serde_json::from_str(&body).map_err(|err| ServiceError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ServiceError> {
        let request = self.client.post(self.url(LOGIN_ENDPOINT)).json(credentials);
        self.execute(LOGIN_ENDPOINT, request).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ServiceError> {
        let request = self.client.post(self.url(REGISTER_ENDPOINT)).json(credentials);
        self.execute(REGISTER_ENDPOINT, request).await
    }

    async fn profile(&self, token: &str) -> Result<ProfileResponse, ServiceError> {
        let request = self.client.get(self.url(PROFILE_ENDPOINT)).bearer_auth(token);
        self.execute(PROFILE_ENDPOINT, request).await
    }

    async fn current_session(&self, token: &str) -> Result<CurrentSessionResponse, ServiceError> {
        let request = self
            .client
            .get(self.url(CURRENT_SESSION_ENDPOINT))
            .bearer_auth(token);
        self.execute(CURRENT_SESSION_ENDPOINT, request).await
    }

    async fn send_message(
        &self,
        token: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ServiceError> {
        let http_request = self
            .client
            .post(self.url(CHAT_ENDPOINT))
            .bearer_auth(token)
            .json(request);
        self.execute(CHAT_ENDPOINT, http_request).await
    }
}
