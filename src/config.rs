//! Runtime configuration, read from the environment (and `.env`).
//!
//! | Variable              | Default                 | Description                  |
//! |-----------------------|-------------------------|------------------------------|
//! | `VIDEO_API_URL`       | `http://localhost:8000` | Backend base URL             |
//! | `POLL_INTERVAL_MS`    | `1000`                  | Delay between status polls   |
//! | `SUBMIT_TIMEOUT_SECS` | `300`                   | Ceiling for the submit call  |

use std::time::Duration;

use crate::controller::PollSettings;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL without trailing slash
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub submit_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            submit_timeout: Duration::from_secs(DEFAULT_SUBMIT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Bad or zero numbers fall back
    /// to the defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup("VIDEO_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| normalize_base_url(&v))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let poll_ms = positive_number(&lookup, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS);
        let timeout_secs =
            positive_number(&lookup, "SUBMIT_TIMEOUT_SECS", DEFAULT_SUBMIT_TIMEOUT_SECS);

        Self {
            api_base_url,
            poll_interval: Duration::from_millis(poll_ms),
            submit_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Replace the base URL, e.g. from `--api-url`.
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_base_url = normalize_base_url(url);
        self
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            poll_interval: self.poll_interval,
            submit_timeout: self.submit_timeout,
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn positive_number(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => v,
        _ => {
            tracing::warn!(key, value = %raw, default, "Ignoring invalid setting");
            default
        }
    }
}
