//! Local identity recovery from a bearer token.
//!
//! The token is never verified here. The payload is only read to show who
//! the client believes it is signed in as; the service remains the
//! authority on whether the token is valid.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

/// Payload fields checked for a display name, highest priority first.
pub const DISPLAY_NAME_CLAIMS: &[&str] = &["sub", "username", "preferred_username", "name", "identity"];

const EXPIRY_CLAIM: &str = "exp";

/// base64url that accepts both padded and unpadded input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            expires_at: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Resolves the identity carried in `token`, or `None` if it cannot be read.
pub fn resolve(token: &str) -> Option<Identity> {
    match decode_payload(token) {
        Ok(payload) => {
            let display_name = display_name_from(&payload);
            if display_name.is_none() {
                debug!("Token payload carries no display name claim");
            }
            display_name.map(|display_name| Identity {
                display_name,
                expires_at: expiry_from(&payload),
            })
        }
        Err(reason) => {
            debug!(reason, "Could not decode token payload");
            None
        }
    }
}

fn decode_payload(token: &str) -> Result<Map<String, Value>, &'static str> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err("token does not have three segments");
    };

    if payload.is_empty() {
        return Err("payload segment is empty");
    }

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .map_err(|_| "payload is not valid base64url")?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("payload is not a JSON object"),
        Err(_) => Err("payload is not valid JSON"),
    }
}

fn display_name_from(payload: &Map<String, Value>) -> Option<String> {
    DISPLAY_NAME_CLAIMS
        .iter()
        .filter_map(|claim| payload.get(*claim))
        .find_map(claim_text)
}

fn claim_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(number.to_string()),
        _ => None,
    }
}

fn expiry_from(payload: &Map<String, Value>) -> Option<DateTime<Utc>> {
    payload
        .get(EXPIRY_CLAIM)
        .and_then(Value::as_i64)
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
}
