//! Metrics collection utilities.
//!
//! Aggregates task counts and solve latency globally and per wire task type.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::tasks::core::types::TaskOutcome;

/// Aggregated metrics across all task types.
#[derive(Debug, Clone)]
pub struct GlobalStats {
    pub started_at: DateTime<Utc>,
    pub tasks_created: u64,
    pub completed: u64,
    pub ready: u64,
    pub failures: u64,
    pub average_solve_time: Option<Duration>,
}

impl Default for GlobalStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            tasks_created: 0,
            completed: 0,
            ready: 0,
            failures: 0,
            average_solve_time: None,
        }
    }
}

/// Per task-type metrics snapshot.
#[derive(Debug, Clone)]
pub struct TaskTypeStats {
    pub task_type: String,
    pub created: u64,
    pub creation_failures: u64,
    pub ready: u64,
    pub errors: u64,
    pub timed_out: u64,
    pub failed: u64,
    pub retries: u64,
    pub average_solve_time: Option<Duration>,
    pub p95_solve_time: Option<Duration>,
}

impl TaskTypeStats {
    fn from_accumulator(task_type: &str, acc: &TypeAccumulator) -> Self {
        let (avg, p95) = acc.latency_stats();
        Self {
            task_type: task_type.to_string(),
            created: acc.created,
            creation_failures: acc.creation_failures,
            ready: acc.ready,
            errors: acc.errors,
            timed_out: acc.timed_out,
            failed: acc.failed,
            retries: acc.retries,
            average_solve_time: avg,
            p95_solve_time: p95,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub global: GlobalStats,
    pub task_types: Vec<TaskTypeStats>,
}

#[derive(Debug)]
struct TypeAccumulator {
    created: u64,
    creation_failures: u64,
    ready: u64,
    errors: u64,
    timed_out: u64,
    failed: u64,
    retries: u64,
    latencies: VecDeque<Duration>,
    max_window: usize,
}

impl TypeAccumulator {
    fn new(max_window: usize) -> Self {
        Self {
            created: 0,
            creation_failures: 0,
            ready: 0,
            errors: 0,
            timed_out: 0,
            failed: 0,
            retries: 0,
            latencies: VecDeque::with_capacity(max_window),
            max_window,
        }
    }

    fn record_completion(&mut self, outcome: TaskOutcome, elapsed: Duration) {
        match outcome {
            TaskOutcome::Ready => {
                self.ready += 1;
                if self.latencies.len() == self.max_window {
                    self.latencies.pop_front();
                }
                self.latencies.push_back(elapsed);
            }
            TaskOutcome::Error => self.errors += 1,
            TaskOutcome::TimedOut => self.timed_out += 1,
            TaskOutcome::Failed => self.failed += 1,
        }
    }

    fn latency_stats(&self) -> (Option<Duration>, Option<Duration>) {
        if self.latencies.is_empty() {
            return (None, None);
        }
        let mut samples: Vec<_> = self.latencies.iter().cloned().collect();
        samples.sort_unstable();
        let avg = samples.iter().map(|d| d.as_secs_f64()).sum::<f64>() / samples.len() as f64;
        let p95_index = ((samples.len() as f64 * 0.95).ceil() as usize).saturating_sub(1);
        (Some(Duration::from_secs_f64(avg)), Some(samples[p95_index]))
    }
}

#[derive(Debug)]
struct MetricsState {
    global: GlobalStats,
    max_window: usize,
    task_types: HashMap<String, TypeAccumulator>,
}

impl MetricsState {
    fn new(max_window: usize) -> Self {
        Self {
            global: GlobalStats::default(),
            max_window,
            task_types: HashMap::new(),
        }
    }

    fn accumulator_mut(&mut self, task_type: &str) -> &mut TypeAccumulator {
        self.task_types
            .entry(task_type.to_string())
            .or_insert_with(|| TypeAccumulator::new(self.max_window))
    }
}

/// Thread-safe metrics collector shared by the client and its handlers.
#[derive(Clone, Debug)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsState>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsState::new(128))),
        }
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsState::new(window.max(16)))),
        }
    }

    fn state(&self) -> MutexGuard<'_, MetricsState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_creation(&self, task_type: &str, created: bool) {
        let mut guard = self.state();
        if created {
            guard.global.tasks_created += 1;
        }
        let acc = guard.accumulator_mut(task_type);
        if created {
            acc.created += 1;
        } else {
            acc.creation_failures += 1;
        }
    }

    pub fn record_retry(&self, task_type: &str) {
        self.state().accumulator_mut(task_type).retries += 1;
    }

    pub fn record_completion(&self, task_type: &str, outcome: TaskOutcome, elapsed: Duration) {
        let mut guard = self.state();
        guard.global.completed += 1;
        if outcome == TaskOutcome::Ready {
            guard.global.ready += 1;
            guard.global.average_solve_time = Some(match guard.global.average_solve_time {
                Some(avg) => Duration::from_secs_f64(avg.as_secs_f64() * 0.9 + elapsed.as_secs_f64() * 0.1),
                None => elapsed,
            });
        } else {
            guard.global.failures += 1;
        }
        guard.accumulator_mut(task_type).record_completion(outcome, elapsed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let guard = self.state();
        let task_types = guard
            .task_types
            .iter()
            .map(|(task_type, acc)| TaskTypeStats::from_accumulator(task_type, acc))
            .collect();
        MetricsSnapshot {
            global: guard.global.clone(),
            task_types,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
