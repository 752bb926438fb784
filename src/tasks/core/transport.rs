//! Transport contract used by the task client.
//!
//! The client only ever POSTs a JSON body to one of a handful of API methods
//! and reads back the raw response text; everything else (status decoding,
//! error folding) happens in the classifier.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Contract that abstracts the HTTP layer between the client and the service.
#[async_trait]
pub trait TaskTransport: Send + Sync {
    async fn post(&self, url: &Url, body: &Value) -> Result<String, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("http transport error: {0}")]
    Http(String),
    #[error("unexpected http status {0}")]
    Status(u16),
    #[error("transport call timed out")]
    Timeout,
    #[error("transport call was cancelled")]
    Cancelled,
}

/// API methods reachable through the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    CreateTask,
    GetTaskResult,
    ReportIncorrectImageCaptcha,
    ReportIncorrectRecaptcha,
    ReportCorrectRecaptcha,
    ReportIncorrectHCaptcha,
}

impl ApiMethod {
    /// Path segment appended to the configured base URL.
    pub fn path(&self) -> &'static str {
        match self {
            ApiMethod::CreateTask => "createTask",
            ApiMethod::GetTaskResult => "getTaskResult",
            ApiMethod::ReportIncorrectImageCaptcha => "reportIncorrectImageCaptcha",
            ApiMethod::ReportIncorrectRecaptcha => "reportIncorrectRecaptcha",
            ApiMethod::ReportCorrectRecaptcha => "reportCorrectRecaptcha",
            ApiMethod::ReportIncorrectHCaptcha => "reportIncorrectHcaptcha",
        }
    }
}
