//! Cross-cutting services module
//!
//! Lifecycle events and the metrics they feed.

pub mod events;
pub mod metrics;

pub use events::{
    EventDispatcher, EventHandler, LoggingHandler, MetricsHandler, RetryEvent, TaskCompletedEvent,
    TaskCreatedEvent, TaskEvent, TaskPolledEvent,
};
pub use metrics::{GlobalStats, MetricsCollector, MetricsSnapshot, TaskTypeStats};
