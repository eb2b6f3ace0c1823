//! Client configuration from environment variables.

use std::{path::PathBuf, time::Duration};

/// Where the client talks to and how long it waits
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the auth server, without a trailing slash
    pub server_url: String,
    /// File holding the persisted session token
    pub session_file: PathBuf,
    /// Deadline for credential and profile calls
    pub request_timeout: Duration,
    /// Deadline for `GET /auth/verify`
    pub verify_timeout: Duration,
    /// Deadline for diagnostics probes
    pub probe_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            session_file: default_session_file(),
            request_timeout: Duration::from_secs(15),
            verify_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Config for `server_url` with every other setting at its default
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: normalize_url(server_url.into()),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// `server_override` (from CLI args) wins over `ACTSFILE_SERVER`.
    pub fn from_env(server_override: Option<String>) -> Self {
        let defaults = Self::default();

        let server_url = server_override
            .or_else(|| std::env::var("ACTSFILE_SERVER").ok())
            .map(normalize_url)
            .unwrap_or(defaults.server_url);

        let session_file = std::env::var("ACTSFILE_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        Self {
            server_url,
            session_file,
            request_timeout: secs_env_or("ACTSFILE_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            verify_timeout: secs_env_or("ACTSFILE_VERIFY_TIMEOUT_SECS", defaults.verify_timeout),
            probe_timeout: secs_env_or("ACTSFILE_PROBE_TIMEOUT_SECS", defaults.probe_timeout),
        }
    }
}

fn default_session_file() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".actsfile").join("session"),
        Err(_) => PathBuf::from(".actsfile_session"),
    }
}

fn normalize_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Whole seconds from `key`; zero or unparsable values keep the default
fn secs_env_or(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.verify_timeout, Duration::from_secs(10));
        assert!(config.session_file.ends_with("session") || config.session_file.ends_with(".actsfile_session"));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ClientConfig::new("http://localhost:3000/ ");
        assert_eq!(config.server_url, "http://localhost:3000");
    }

    #[test]
    fn test_override_beats_env() {
        let config = ClientConfig::from_env(Some("http://example.test:9/".to_string()));
        assert_eq!(config.server_url, "http://example.test:9");
    }
}
