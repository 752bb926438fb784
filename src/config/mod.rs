//! Client configuration.
//!
//! [`ClientConfig`] is an immutable snapshot: the client copies the current
//! `Arc` at the start of each call, so swapping it only affects later calls.
//! It can be built in code with the `with_*` methods or loaded from JSON,
//! where durations are written in milliseconds:
//!
//! ```json
//! {
//!   "max_wait_for_task_result_ms": 120000,
//!   "poll_interval_ms": 1000,
//!   "max_http_request_time_ms": 60000,
//!   "solve_attempts": 2,
//!   "soft_id": 1234,
//!   "api_base_url": "https://api.anti-captcha.com/"
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::tasks::core::transport::ApiMethod;

pub const DEFAULT_API_BASE_URL: &str = "https://api.anti-captcha.com/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("failed to build endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

/// Timing and retry knobs for the task client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Polling budget, measured from the first poll of a task.
    #[serde(rename = "max_wait_for_task_result_ms", with = "duration_ms")]
    pub max_wait_for_task_result: Duration,
    #[serde(rename = "poll_interval_ms", with = "duration_ms")]
    pub poll_interval: Duration,
    /// Upper bound for a single HTTP call.
    #[serde(rename = "max_http_request_time_ms", with = "duration_ms")]
    pub max_http_request_time: Duration,
    /// Create+poll cycles attempted by `solve`; `0` behaves like `1`.
    pub solve_attempts: u32,
    pub soft_id: Option<u32>,
    pub api_base_url: Url,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_wait_for_task_result: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
            max_http_request_time: Duration::from_secs(60),
            solve_attempts: 1,
            soft_id: None,
            api_base_url: default_base_url(),
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait_for_task_result = max_wait;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.max_http_request_time = timeout;
        self
    }

    pub fn with_solve_attempts(mut self, attempts: u32) -> Self {
        self.solve_attempts = attempts;
        self
    }

    pub fn with_soft_id(mut self, soft_id: u32) -> Self {
        self.soft_id = Some(soft_id);
        self
    }

    pub fn with_api_base_url(mut self, url: Url) -> Self {
        self.api_base_url = url;
        self
    }

    /// Number of cycles `solve` will run.
    pub fn effective_attempts(&self) -> u32 {
        self.solve_attempts.max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll interval must be greater than zero".into()));
        }
        if self.max_http_request_time.is_zero() {
            return Err(ConfigError::Invalid("http request time must be greater than zero".into()));
        }
        if !matches!(self.api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "api base url must use http or https, got '{}'",
                self.api_base_url.scheme()
            )));
        }
        Ok(())
    }

    /// Absolute URL for `method` under the configured base.
    pub fn endpoint(&self, method: ApiMethod) -> Result<Url, ConfigError> {
        let mut base = self.api_base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(method.path())?)
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default api base url is valid")
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
