//! Task-level building blocks: the request catalog, validation, payload
//! construction, typed requests and solutions, and response classification.

pub mod catalog;
pub mod core;
pub mod payload;
pub mod requests;
pub mod solutions;
pub mod validation;

pub use catalog::{CatalogEntry, PayloadRule, TaskKind};
pub use payload::BuildError;
pub use requests::{CaptchaRequest, ProxyExtension, WebsiteTarget};
pub use solutions::Solution;
pub use validation::{ValidationError, ValidationResult, Validator};
