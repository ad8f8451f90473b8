//! Plain-text rendering of timeline entries for the terminal.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::core::identity::Identity;
use crate::core::message::Delivery;
use crate::core::timeline::TimelineEntry;

const USER_PREFIX: &str = "You: ";

/// Reduces a service timestamp to `HH:MM`, or `None` if it is not recognised.
pub fn short_time(timestamp: &str) -> Option<String> {
    let timestamp = timestamp.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.format("%H:%M").to_string());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        .map(|parsed| parsed.format("%H:%M").to_string())
}

pub fn format_entry(entry: &TimelineEntry) -> String {
    let mut line = String::new();
    if let Some(time) = entry.message.timestamp.as_deref().and_then(short_time) {
        line.push_str(&format!("[{time}] "));
    }
    if entry.origin.is_notice() {
        line.push_str("⚠️  ");
    } else if entry.is_user() {
        line.push_str(USER_PREFIX);
    }
    line.push_str(entry.text());
    match entry.delivery {
        Some(Delivery::Pending) => line.push_str(" …"),
        Some(Delivery::Failed) => line.push_str(" (not delivered)"),
        _ => {}
    }
    line
}

pub fn print_entries(entries: &[TimelineEntry]) {
    for entry in entries {
        println!("{}", format_entry(entry));
    }
}

pub fn describe_identity(identity: &Identity, now: DateTime<Utc>) -> String {
    match identity.expires_at {
        Some(expires_at) if identity.is_expired_at(now) => format!(
            "Signed in as {} (token expired {}; sign in again)",
            identity.display_name,
            expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
        Some(expires_at) => format!(
            "Signed in as {} (token expires {})",
            identity.display_name,
            expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => format!("Signed in as {}", identity.display_name),
    }
}
