use std::time::Duration;

use crate::core::config::data::{Config, CredentialBackend};
use crate::utils::url::normalize_base_url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const BASE_URL_ENV: &str = "LILITH_BASE_URL";

impl Config {
    /// Base URL with precedence flag > environment > config file > default.
    pub fn resolve_base_url(&self, flag: Option<&str>, env_value: Option<&str>) -> String {
        let chosen = [flag, env_value, self.base_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        normalize_base_url(chosen)
    }

    pub fn credential_backend(&self) -> CredentialBackend {
        self.credential_backend.unwrap_or_default()
    }

    /// Zero is treated the same as unset.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
