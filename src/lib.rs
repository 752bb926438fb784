//! # anticaptcha-rs
//!
//! Async client for the Anti-Captcha task API.
//!
//! Requests are strongly typed: each challenge family is a struct that knows
//! its task kind and the solution shape it produces. The client validates the
//! request locally, builds the wire payload, creates the task, polls until it
//! settles and optionally recreates it when the service reports an error.
//!
//! ## Features
//!
//! - 22 task kinds: image, reCAPTCHA v2/v3/Enterprise, FunCaptcha, GeeTest
//!   v3/v4, Turnstile, Prosopo, FriendlyCaptcha and AWS WAF, with and without
//!   proxies
//! - Field validation that reports every problem at once
//! - Uniform results: transport, decoding and remote errors share one shape
//! - Cooperative cancellation through `tokio_util::sync::CancellationToken`
//! - Lifecycle events with logging and metrics handlers
//!
//! ## Example
//!
//! ```no_run
//! use anticaptcha_rs::{AntiCaptchaClient, TaskOptions, TurnstileRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AntiCaptchaClient::new("YOUR_CLIENT_KEY")?;
//!     let request = TurnstileRequest::new("https://example.com/login", "0x4AAAAAAA");
//!     let result = client.solve(&request, &TaskOptions::default()).await;
//!     match result.solution {
//!         Some(solution) => println!("token: {}", solution.token),
//!         None => println!("failed: {:?}", result.error),
//!     }
//!     Ok(())
//! }
//! ```

mod client;

pub mod config;
pub mod modules;
pub mod tasks;

pub use crate::client::{
    AntiCaptchaClient,
    AntiCaptchaClientBuilder,
    ClientError,
    ClientResult,
    TaskOptions,
};

pub use crate::config::{ClientConfig, ConfigError};

pub use crate::tasks::core::{
    ActionResult,
    ApiError,
    ApiMethod,
    CreateTaskOutcome,
    ErrorClass,
    ProxyConfig,
    ProxyType,
    ReportOutcome,
    ReqwestTransport,
    TaskId,
    TaskMetadata,
    TaskOutcome,
    TaskResult,
    TaskStatus,
    TaskTransport,
    TransportError,
    error_codes,
};

pub use crate::tasks::{
    BuildError,
    CaptchaRequest,
    PayloadRule,
    ProxyExtension,
    Solution,
    TaskKind,
    ValidationError,
    ValidationResult,
    WebsiteTarget,
};

pub use crate::tasks::requests::{
    AmazonWafRequest,
    CoordinatesMode,
    FriendlyCaptchaRequest,
    FunCaptchaRequest,
    GeeTestV3Request,
    GeeTestV4Request,
    ImageToCoordinatesRequest,
    ImageToTextRequest,
    NumericOption,
    ProsopoRequest,
    RecaptchaV2EnterpriseRequest,
    RecaptchaV2Request,
    RecaptchaV3Request,
    TurnstileRequest,
};

pub use crate::tasks::solutions::{
    AmazonWafSolution,
    FunCaptchaSolution,
    GeeTestV3Solution,
    GeeTestV4Solution,
    ImageToCoordinatesSolution,
    ImageToTextSolution,
    RecaptchaSolution,
    TokenSolution,
    TurnstileSolution,
};

pub use crate::modules::{
    EventDispatcher,
    EventHandler,
    GlobalStats,
    LoggingHandler,
    MetricsCollector,
    MetricsHandler,
    MetricsSnapshot,
    RetryEvent,
    TaskCompletedEvent,
    TaskCreatedEvent,
    TaskEvent,
    TaskPolledEvent,
    TaskTypeStats,
};

pub use tokio_util::sync::CancellationToken;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
