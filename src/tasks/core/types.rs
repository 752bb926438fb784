//! Core data structures shared by the catalog, payload builder, response
//! classifier, and the orchestrating client.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier the service assigns to a task at creation time.
pub type TaskId = i64;

/// Synthetic error codes used for failures detected on the client side.
pub mod error_codes {
    pub const BAD_REQUEST: &str = "BadRequest";
    pub const JSON_ERROR: &str = "JsonError";
    pub const HTTP_ERROR: &str = "HttpError";
    pub const CANCELLED: &str = "Cancelled";
    pub const REQUEST_TIMEOUT: &str = "RequestTimeout";
    pub const INTERNAL_SERVER_ERROR: &str = "InternalServerError";
    pub const UNEXPECTED_ERROR: &str = "UnexpectedError";
}

/// Remote task state as reported by `getTaskResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Ready,
    Error,
}

/// Proxy protocols understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    /// Lower-case token sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proxy the remote worker should route its browser through.
///
/// Type, address and port are mandatory for proxied tasks; they are optional
/// here so that an incomplete configuration is reported by validation instead
/// of being impossible to express.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_type: Option<ProxyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_password: Option<String>,
}

impl ProxyConfig {
    pub fn new(proxy_type: ProxyType, address: impl Into<String>, port: u16) -> Self {
        Self {
            proxy_type: Some(proxy_type),
            proxy_address: Some(address.into()),
            proxy_port: Some(port),
            proxy_login: None,
            proxy_password: None,
        }
    }

    pub fn with_credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.proxy_login = Some(login.into());
        self.proxy_password = Some(password.into());
        self
    }
}

/// Broad category of a failure carried in a [`TaskResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The request failed local validation; nothing was sent.
    Validation,
    /// The request could not be turned into a wire payload.
    Build,
    /// Network failure or transport timeout.
    Transport,
    /// The response body could not be decoded.
    Decode,
    /// The service reported an error (`errorId` / `status = error`).
    Protocol,
    /// The polling budget ran out while the task was still processing.
    Timeout,
    /// The caller cancelled the operation.
    Cancelled,
}

/// Error fields attached to a result, whether reported remotely or
/// synthesised locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub error_id: Option<i64>,
    pub code: String,
    pub description: String,
    pub class: ErrorClass,
}

impl ApiError {
    pub fn new(class: ErrorClass, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error_id: None,
            code: code.into(),
            description: description.into(),
            class,
        }
    }

    pub fn with_error_id(mut self, error_id: i64) -> Self {
        self.error_id = Some(error_id);
        self
    }

    pub fn cancelled() -> Self {
        Self::new(
            ErrorClass::Cancelled,
            error_codes::CANCELLED,
            "Operation was canceled.",
        )
    }

    pub fn polling_timeout(task_id: TaskId, budget: Duration) -> Self {
        Self::new(
            ErrorClass::Timeout,
            error_codes::REQUEST_TIMEOUT,
            format!(
                "task {task_id} did not finish within the configured timeout ({} ms)",
                budget.as_millis()
            ),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_id {
            Some(id) => write!(f, "[{id}] {}: {}", self.code, self.description),
            None => write!(f, "{}: {}", self.code, self.description),
        }
    }
}

/// Billing and timing details the service attaches to finished tasks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub cost: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub create_time: Option<i64>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub solve_count: Option<u32>,
}

/// How an orchestration ended, derived from a [`TaskResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    Ready,
    Error,
    TimedOut,
    /// A local failure before any remote status was obtained.
    Failed,
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskOutcome::Ready => "ready",
            TaskOutcome::Error => "error",
            TaskOutcome::TimedOut => "timed_out",
            TaskOutcome::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Uniform outcome container for every task operation.
///
/// The solution is only populated when the status is [`TaskStatus::Ready`];
/// error fields are set whenever the status is [`TaskStatus::Error`] or a
/// failure happened before a status was obtained.
#[derive(Debug, Clone)]
pub struct TaskResult<S> {
    pub task_id: Option<TaskId>,
    pub status: Option<TaskStatus>,
    pub solution: Option<S>,
    pub error: Option<ApiError>,
    pub metadata: TaskMetadata,
    pub raw_response: Option<String>,
}

impl<S> TaskResult<S> {
    /// Result carrying only error fields.
    pub fn failure(task_id: Option<TaskId>, error: ApiError) -> Self {
        Self {
            task_id,
            status: None,
            solution: None,
            error: Some(error),
            metadata: TaskMetadata::default(),
            raw_response: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == Some(TaskStatus::Ready) && self.solution.is_some() && self.error.is_none()
    }

    pub fn is_processing(&self) -> bool {
        self.status == Some(TaskStatus::Processing) && self.error.is_none()
    }

    pub fn is_timed_out(&self) -> bool {
        self.error_class() == Some(ErrorClass::Timeout)
    }

    pub fn error_class(&self) -> Option<ErrorClass> {
        self.error.as_ref().map(|error| error.class)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|error| error.code.as_str())
    }

    pub fn outcome(&self) -> TaskOutcome {
        if self.is_timed_out() {
            return TaskOutcome::TimedOut;
        }
        match self.status {
            Some(TaskStatus::Ready) if self.error.is_none() => TaskOutcome::Ready,
            Some(TaskStatus::Error) => TaskOutcome::Error,
            _ => TaskOutcome::Failed,
        }
    }
}

/// Outcome of a `createTask` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskOutcome {
    pub task_id: Option<TaskId>,
    pub error: Option<ApiError>,
    pub raw_response: Option<String>,
}

impl CreateTaskOutcome {
    pub fn failed(error: ApiError) -> Self {
        Self {
            task_id: None,
            error: Some(error),
            raw_response: None,
        }
    }

    pub fn is_created(&self) -> bool {
        self.task_id.is_some() && self.error.is_none()
    }
}

/// Outcome of a one-shot action such as reporting a wrong answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub status: Option<String>,
    pub error: Option<ApiError>,
    pub raw_response: Option<String>,
}

impl ActionResult {
    pub fn failed(error: ApiError) -> Self {
        Self {
            status: None,
            error: Some(error),
            raw_response: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Feedback the caller can send about a solved task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportOutcome {
    IncorrectImageCaptcha,
    IncorrectRecaptcha,
    CorrectRecaptcha,
    IncorrectHCaptcha,
}

// The service sends `cost` as a string, but older responses used a number.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_reflects_status_and_error_class() {
        let mut result: TaskResult<()> = TaskResult::failure(Some(7), ApiError::cancelled());
        assert_eq!(result.outcome(), TaskOutcome::Failed);

        result.error = Some(ApiError::polling_timeout(7, Duration::from_secs(5)));
        result.status = Some(TaskStatus::Processing);
        assert_eq!(result.outcome(), TaskOutcome::TimedOut);
        assert!(result.is_timed_out());

        result.error = Some(ApiError::new(ErrorClass::Protocol, "ERROR_CAPTCHA_UNSOLVABLE", "no"));
        result.status = Some(TaskStatus::Error);
        assert_eq!(result.outcome(), TaskOutcome::Error);
    }

    #[test]
    fn metadata_accepts_numeric_cost() {
        let metadata: TaskMetadata =
            serde_json::from_str(r#"{"cost": 0.0007, "ip": "1.2.3.4", "solveCount": 1}"#).unwrap();
        assert_eq!(metadata.cost.as_deref(), Some("0.0007"));
        assert_eq!(metadata.solve_count, Some(1));
    }

    #[test]
    fn timeout_description_names_task_and_budget() {
        let error = ApiError::polling_timeout(42, Duration::from_millis(5000));
        assert_eq!(error.code, error_codes::REQUEST_TIMEOUT);
        assert!(error.description.contains("42"));
        assert!(error.description.contains("5000 ms"));
    }
}
