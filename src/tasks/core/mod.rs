//! Core utilities shared by the catalog, payload builder, and task client.

pub mod classifier;
pub mod reqwest_transport;
pub mod transport;
pub mod types;

pub use classifier::{classify_action, classify_creation, classify_task_result, transport_failure};
pub use reqwest_transport::ReqwestTransport;
pub use transport::{ApiMethod, TaskTransport, TransportError};
pub use types::{
    ActionResult, ApiError, CreateTaskOutcome, ErrorClass, ProxyConfig, ProxyType, ReportOutcome,
    TaskId, TaskMetadata, TaskOutcome, TaskResult, TaskStatus, error_codes,
};
