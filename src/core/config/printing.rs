use std::fmt::Write as _;

use crate::core::config::data::Config;

impl Config {
    /// Human-readable summary of the effective settings.
    pub fn describe(&self, base_url: &str) -> String {
        let mut out = String::from("Current configuration:\n");
        let _ = writeln!(out, "  base-url: {base_url}");
        let _ = writeln!(out, "  credential-backend: {}", self.credential_backend());
        match self.request_timeout() {
            Some(timeout) => {
                let _ = writeln!(out, "  request-timeout: {}s", timeout.as_secs());
            }
            None => out.push_str("  request-timeout: (none)\n"),
        }
        out
    }
}
