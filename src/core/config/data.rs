use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the bearer token and display name are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// `credentials.toml` in the platform data directory.
    #[default]
    File,
    /// The operating system keyring.
    Keyring,
}

impl CredentialBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialBackend::File => "file",
            CredentialBackend::Keyring => "keyring",
        }
    }
}

impl fmt::Display for CredentialBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root URL of the Lilith service (e.g., "http://localhost:5000")
    pub base_url: Option<String>,
    /// Credential storage backend ("file" or "keyring")
    pub credential_backend: Option<CredentialBackend>,
    /// Give up on a request after this many seconds; unset waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

/// Keys accepted by `lilith config set` and `lilith config unset`.
pub const SETTING_KEYS: &[&str] = &["base-url", "credential-backend", "request-timeout"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (expected one of {})",
                SETTING_KEYS.join(", ")
            ),
            SettingError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {key}: {value}")
            }
        }
    }
}

impl std::error::Error for SettingError {}

impl Config {
    /// Sets `key` to `value`, or clears it back to its default for `None`.
    pub fn apply_setting(&mut self, key: &str, value: Option<&str>) -> Result<(), SettingError> {
        let value = value.map(str::trim).filter(|value| !value.is_empty());
        match key {
            "base-url" => self.base_url = value.map(str::to_string),
            "credential-backend" => {
                self.credential_backend = match value {
                    None => None,
                    Some("file") => Some(CredentialBackend::File),
                    Some("keyring") => Some(CredentialBackend::Keyring),
                    Some(other) => {
                        return Err(SettingError::InvalidValue {
                            key: "credential-backend",
                            value: other.to_string(),
                        })
                    }
                }
            }
            "request-timeout" => {
                self.request_timeout_secs = match value {
                    None => None,
                    Some(raw) => Some(raw.trim_end_matches('s').parse().map_err(|_| {
                        SettingError::InvalidValue {
                            key: "request-timeout",
                            value: raw.to_string(),
                        }
                    })?),
                }
            }
            other => return Err(SettingError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
