//! Task lifecycle events.
//!
//! The client reports creation, polling, retries and completion through an
//! [`EventDispatcher`]; handlers turn them into log lines or metrics.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::metrics::MetricsCollector;
use crate::tasks::core::types::{TaskId, TaskOutcome, TaskStatus};

/// A `createTask` call finished, successfully or not.
#[derive(Debug, Clone)]
pub struct TaskCreatedEvent {
    pub task_type: &'static str,
    pub task_id: Option<TaskId>,
    pub attempt: u32,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One `getTaskResult` poll was classified.
#[derive(Debug, Clone)]
pub struct TaskPolledEvent {
    pub task_id: TaskId,
    pub poll: u32,
    pub status: Option<TaskStatus>,
    pub elapsed: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RetryEvent {
    pub task_type: &'static str,
    pub attempt: u32,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// A solve call returned its final result.
#[derive(Debug, Clone)]
pub struct TaskCompletedEvent {
    pub task_type: &'static str,
    pub task_id: Option<TaskId>,
    pub outcome: TaskOutcome,
    pub attempts: u32,
    pub elapsed: Duration,
    pub error_code: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum TaskEvent {
    Created(TaskCreatedEvent),
    Polled(TaskPolledEvent),
    Retry(RetryEvent),
    Completed(TaskCompletedEvent),
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &TaskEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, event: TaskEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

/// Logs events using the `log` crate.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Created(created) => match (&created.task_id, &created.error) {
                (Some(task_id), _) => {
                    log::debug!("created {} task {} (attempt {})", created.task_type, task_id, created.attempt);
                }
                (None, Some(error)) => {
                    log::warn!("failed to create {} task: {}", created.task_type, error);
                }
                (None, None) => {}
            },
            TaskEvent::Polled(polled) => {
                log::debug!(
                    "task {} poll #{} -> {:?} ({:.2}s)",
                    polled.task_id,
                    polled.poll,
                    polled.status,
                    polled.elapsed.as_secs_f64()
                );
            }
            TaskEvent::Retry(retry) => {
                log::info!("retry {} attempt {}: {}", retry.task_type, retry.attempt, retry.reason);
            }
            TaskEvent::Completed(done) => {
                if done.outcome == TaskOutcome::Ready {
                    log::info!(
                        "{} task {:?} ready after {} attempt(s) in {:.2}s",
                        done.task_type,
                        done.task_id,
                        done.attempts,
                        done.elapsed.as_secs_f64()
                    );
                } else {
                    log::warn!(
                        "{} task {:?} ended {} ({})",
                        done.task_type,
                        done.task_id,
                        done.outcome,
                        done.error_code.as_deref().unwrap_or("no error code")
                    );
                }
            }
        }
    }
}

/// Metrics handler that feeds the metrics collector.
#[derive(Clone, Debug)]
pub struct MetricsHandler {
    metrics: MetricsCollector,
}

impl MetricsHandler {
    pub fn new(metrics: MetricsCollector) -> Self {
        Self { metrics }
    }
}

impl EventHandler for MetricsHandler {
    fn handle(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Created(created) => {
                self.metrics.record_creation(created.task_type, created.task_id.is_some());
            }
            TaskEvent::Retry(retry) => {
                self.metrics.record_retry(retry.task_type);
            }
            TaskEvent::Completed(done) => {
                self.metrics.record_completion(done.task_type, done.outcome, done.elapsed);
            }
            TaskEvent::Polled(_) => {}
        }
    }
}
