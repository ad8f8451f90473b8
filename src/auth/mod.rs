//! Sign-in, sign-up and sign-out.
//!
//! These calls only obtain or discard a bearer token; the conversation core
//! picks the token up from the [`CredentialStore`] on its next operation.

use std::error::Error;
use std::fmt;

use tracing::{info, warn};

use crate::api::Credentials;
use crate::core::credentials::{CredentialStore, CredentialStoreError};
use crate::core::identity::{self, Identity};
use crate::core::service::{ChatService, ServiceError};

pub mod ui;

const SIGN_IN_FALLBACK: &str = "could not sign in";
const SIGN_UP_FALLBACK: &str = "could not register";
const TOKEN_MISSING: &str = "token not received, please sign in again";

#[derive(Debug)]
pub enum AuthError {
    /// Username or password was blank.
    MissingCredentials,
    /// The service refused the request; carries its explanation or a fallback.
    Rejected(String),
    /// `/login` succeeded without handing out a token.
    TokenMissing,
    Store(CredentialStoreError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "username and password are required"),
            AuthError::Rejected(message) => write!(f, "{message}"),
            AuthError::TokenMissing => write!(f, "{TOKEN_MISSING}"),
            AuthError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AuthError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CredentialStoreError> for AuthError {
    fn from(err: CredentialStoreError) -> Self {
        AuthError::Store(err)
    }
}

fn rejection(err: ServiceError, fallback: &str) -> AuthError {
    warn!(error = %err, "Authentication request failed");
    AuthError::Rejected(err.description().unwrap_or(fallback).to_string())
}

fn credentials(username: &str, password: &str) -> Result<Credentials, AuthError> {
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(Credentials::new(username, password))
}

/// Exchanges a username and password for a token and stores it.
///
/// Returns the identity decoded from the new token, when it carries one.
pub async fn sign_in(
    service: &dyn ChatService,
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<Option<Identity>, AuthError> {
    let credentials = credentials(username, password)?;
    let response = service
        .login(&credentials)
        .await
        .map_err(|err| rejection(err, SIGN_IN_FALLBACK))?;

    let token = match response.access_token.filter(|token| !token.trim().is_empty()) {
        Some(token) => token,
        None => match response.error {
            Some(error) if !error.trim().is_empty() => return Err(AuthError::Rejected(error)),
            _ => return Err(AuthError::TokenMissing),
        },
    };

    store.set_token(&token)?;
    let identity = identity::resolve(&token);
    // an opaque token must not inherit the previous account's name
    let display_name = match &identity {
        Some(identity) => identity.display_name.as_str(),
        None => credentials.username.as_str(),
    };
    store.set_display_name_fallback(display_name)?;
    info!(username = %credentials.username, "Signed in");
    Ok(identity)
}

/// Creates an account. Returns the service's confirmation text.
pub async fn sign_up(
    service: &dyn ChatService,
    username: &str,
    password: &str,
) -> Result<String, AuthError> {
    let credentials = credentials(username, password)?;
    let response = service
        .register(&credentials)
        .await
        .map_err(|err| rejection(err, SIGN_UP_FALLBACK))?;
    info!(username = %credentials.username, "Registered");
    Ok(response.message.unwrap_or_default())
}

/// Forgets the stored token and cached display name.
pub fn sign_out(store: &dyn CredentialStore) -> Result<(), AuthError> {
    store.clear()?;
    info!("Signed out");
    Ok(())
}
