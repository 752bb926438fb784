//! High level task orchestration.
//!
//! Wires the catalog, validators, payload builder and response classifier to
//! a transport, and drives the create -> poll -> classify -> retry lifecycle.
//! Every runtime failure (validation, transport, decoding, remote errors,
//! timeouts, cancellation) comes back inside the returned result rather than
//! as an `Err`.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::time::{Instant, sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, ConfigError};
use crate::modules::events::{
	EventDispatcher, EventHandler, LoggingHandler, MetricsHandler, RetryEvent, TaskCompletedEvent,
	TaskCreatedEvent, TaskEvent, TaskPolledEvent,
};
use crate::modules::metrics::MetricsCollector;
use crate::tasks::catalog;
use crate::tasks::core::{
	ActionResult, ApiError, ApiMethod, CreateTaskOutcome, ErrorClass, ReportOutcome,
	ReqwestTransport, TaskId, TaskResult, TaskStatus, TaskTransport, TransportError,
	classify_action, classify_creation, classify_task_result, error_codes,
};
use crate::tasks::payload;
use crate::tasks::requests::CaptchaRequest;
use crate::tasks::solutions::Solution;

/// Result alias used for construction and configuration.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while building or reconfiguring a client.
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("client key must not be empty")]
	MissingClientKey,
	#[error("transport initialisation failed: {0}")]
	Transport(#[from] TransportError),
	#[error("invalid configuration: {0}")]
	Config(#[from] ConfigError),
}

/// Optional top-level `createTask` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOptions {
	/// Worker pool, `en` or `rn`.
	pub language_pool: Option<String>,
	/// URL the service notifies once the task is finished.
	pub callback_url: Option<String>,
}

impl TaskOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_language_pool(mut self, pool: impl Into<String>) -> Self {
		self.language_pool = Some(pool.into());
		self
	}

	pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
		self.callback_url = Some(url.into());
		self
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskPayload<'a> {
	client_key: &'a str,
	task: Map<String, Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	soft_id: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	language_pool: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	callback_url: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskActionPayload<'a> {
	client_key: &'a str,
	task_id: TaskId,
}

pub struct AntiCaptchaClientBuilder {
	client_key: String,
	config: ClientConfig,
	transport: Option<Arc<dyn TaskTransport>>,
	handlers: Vec<Arc<dyn EventHandler>>,
	enable_logging: bool,
	enable_metrics: bool,
}

impl AntiCaptchaClientBuilder {
	pub fn new(client_key: impl Into<String>) -> Self {
		Self {
			client_key: client_key.into(),
			config: ClientConfig::default(),
			transport: None,
			handlers: Vec::new(),
			enable_logging: true,
			enable_metrics: true,
		}
	}

	pub fn with_config(mut self, config: ClientConfig) -> Self {
		self.config = config;
		self
	}

	/// Replace the default reqwest transport.
	pub fn with_transport(mut self, transport: Arc<dyn TaskTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
		self.handlers.push(handler);
		self
	}

	pub fn disable_logging(mut self) -> Self {
		self.enable_logging = false;
		self
	}

	pub fn disable_metrics(mut self) -> Self {
		self.enable_metrics = false;
		self
	}

	pub fn build(self) -> ClientResult<AntiCaptchaClient> {
		if self.client_key.trim().is_empty() {
			return Err(ClientError::MissingClientKey);
		}
		self.config.validate()?;

		let transport: Arc<dyn TaskTransport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(ReqwestTransport::new(self.config.max_http_request_time)?),
		};

		let metrics = MetricsCollector::new();
		let mut events = EventDispatcher::new();
		if self.enable_logging {
			events.register_handler(Arc::new(LoggingHandler));
		}
		if self.enable_metrics {
			events.register_handler(Arc::new(MetricsHandler::new(metrics.clone())));
		}
		for handler in self.handlers {
			events.register_handler(handler);
		}

		Ok(AntiCaptchaClient {
			client_key: self.client_key,
			config: RwLock::new(Arc::new(self.config)),
			transport,
			events,
			metrics,
		})
	}
}

/// Client for the task API.
///
/// Safe to share across tasks behind an `Arc`; concurrent solves only share
/// the read-only catalog and the current configuration snapshot.
pub struct AntiCaptchaClient {
	client_key: String,
	config: RwLock<Arc<ClientConfig>>,
	transport: Arc<dyn TaskTransport>,
	events: EventDispatcher,
	metrics: MetricsCollector,
}

impl AntiCaptchaClient {
	/// Client with default configuration and the reqwest transport.
	pub fn new(client_key: impl Into<String>) -> ClientResult<Self> {
		Self::builder(client_key).build()
	}

	pub fn builder(client_key: impl Into<String>) -> AntiCaptchaClientBuilder {
		AntiCaptchaClientBuilder::new(client_key)
	}

	/// Current configuration snapshot.
	pub fn config(&self) -> Arc<ClientConfig> {
		self.config
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Replaces the configuration for calls started after this returns.
	pub fn configure(&self, config: ClientConfig) -> ClientResult<()> {
		config.validate()?;
		*self.config.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
		Ok(())
	}

	pub fn metrics(&self) -> &MetricsCollector {
		&self.metrics
	}

	/// Creates, polls and, on remote errors, recreates a task until it
	/// settles or the attempt budget runs out.
	pub async fn solve<R: CaptchaRequest>(
		&self,
		request: &R,
		options: &TaskOptions,
	) -> TaskResult<R::Solution> {
		self.solve_with_cancellation(request, options, &CancellationToken::new())
			.await
	}

	/// [`solve`](Self::solve) that stops at the next suspension point once
	/// `cancel` fires.
	pub async fn solve_with_cancellation<R: CaptchaRequest>(
		&self,
		request: &R,
		options: &TaskOptions,
		cancel: &CancellationToken,
	) -> TaskResult<R::Solution> {
		let config = self.config();
		let task_type = catalog::resolve(request.kind()).task_type;
		let attempts = config.effective_attempts();
		let started = Instant::now();
		let mut attempt = 0u32;

		let result = loop {
			attempt += 1;
			let (result, retryable) = self
				.run_cycle(&config, request, options, cancel, attempt)
				.await;

			if !retryable || attempt >= attempts {
				break result;
			}

			self.events.dispatch(TaskEvent::Retry(RetryEvent {
				task_type,
				attempt: attempt + 1,
				reason: result
					.error
					.as_ref()
					.map(ToString::to_string)
					.unwrap_or_default(),
				timestamp: Utc::now(),
			}));
		};

		self.events.dispatch(TaskEvent::Completed(TaskCompletedEvent {
			task_type,
			task_id: result.task_id,
			outcome: result.outcome(),
			attempts: attempt,
			elapsed: started.elapsed(),
			error_code: result.error_code().map(str::to_string),
			timestamp: Utc::now(),
		}));

		result
	}

	/// Validates, builds and submits `request`.
	///
	/// A request that fails validation is answered with a `BadRequest` outcome
	/// without touching the network.
	pub async fn create_task<R: CaptchaRequest>(
		&self,
		request: &R,
		options: &TaskOptions,
		cancel: &CancellationToken,
	) -> CreateTaskOutcome {
		let config = self.config();
		self.create_with(&config, request, options, cancel, 1).await
	}

	/// Single `getTaskResult` poll.
	pub async fn get_task_result<S: Solution>(
		&self,
		task_id: TaskId,
		cancel: &CancellationToken,
	) -> TaskResult<S> {
		let config = self.config();
		self.poll_with(&config, task_id, cancel).await
	}

	/// Polls `task_id` until it is ready, errors, or the wait budget runs out.
	pub async fn wait_for_task_result<S: Solution>(
		&self,
		task_id: TaskId,
		cancel: &CancellationToken,
	) -> TaskResult<S> {
		let config = self.config();
		self.wait_with(&config, task_id, cancel).await
	}

	/// Sends feedback about a finished task.
	pub async fn report_task_outcome(
		&self,
		task_id: TaskId,
		outcome: ReportOutcome,
		cancel: &CancellationToken,
	) -> ActionResult {
		let config = self.config();
		let body = match self.action_body(task_id) {
			Ok(body) => body,
			Err(error) => return ActionResult::failed(error),
		};
		let response = self.call(&config, report_method(outcome), &body, cancel).await;
		classify_action(response)
	}

	async fn run_cycle<R: CaptchaRequest>(
		&self,
		config: &ClientConfig,
		request: &R,
		options: &TaskOptions,
		cancel: &CancellationToken,
		attempt: u32,
	) -> (TaskResult<R::Solution>, bool) {
		let CreateTaskOutcome {
			task_id,
			error,
			raw_response,
		} = self.create_with(config, request, options, cancel, attempt).await;

		let task_id = match (task_id, error) {
			(Some(task_id), None) => task_id,
			(task_id, error) => {
				let error = error.unwrap_or_else(|| {
					ApiError::new(
						ErrorClass::Decode,
						error_codes::UNEXPECTED_ERROR,
						"task creation returned neither a task id nor an error",
					)
				});
				let retryable = matches!(error.class, ErrorClass::Protocol | ErrorClass::Transport);
				let mut result = TaskResult::failure(task_id, error);
				result.raw_response = raw_response;
				return (result, retryable);
			}
		};

		let result = self.wait_with(config, task_id, cancel).await;
		let retryable = result.status == Some(TaskStatus::Error)
			&& result.error_class() == Some(ErrorClass::Protocol);
		(result, retryable)
	}

	async fn create_with<R: CaptchaRequest>(
		&self,
		config: &ClientConfig,
		request: &R,
		options: &TaskOptions,
		cancel: &CancellationToken,
		attempt: u32,
	) -> CreateTaskOutcome {
		let kind = request.kind();
		let entry = catalog::resolve(kind);

		let outcome = match self.prepare_creation(config, request, options) {
			Ok(body) => classify_creation(self.call(config, ApiMethod::CreateTask, &body, cancel).await),
			Err(error) => CreateTaskOutcome::failed(error),
		};

		self.events.dispatch(TaskEvent::Created(TaskCreatedEvent {
			task_type: entry.task_type,
			task_id: outcome.task_id,
			attempt,
			error: outcome.error.as_ref().map(ToString::to_string),
			timestamp: Utc::now(),
		}));

		outcome
	}

	fn prepare_creation<R: CaptchaRequest>(
		&self,
		config: &ClientConfig,
		request: &R,
		options: &TaskOptions,
	) -> Result<Value, ApiError> {
		let kind = request.kind();
		let fields = payload::project(request).map_err(build_failure)?;

		let validation = catalog::resolve(kind).validator.check(&fields);
		if !validation.is_valid() {
			return Err(ApiError::new(
				ErrorClass::Validation,
				error_codes::BAD_REQUEST,
				validation.to_message(),
			));
		}

		let task = payload::finalize(kind, fields).map_err(build_failure)?;
		let body = CreateTaskPayload {
			client_key: &self.client_key,
			task,
			soft_id: config.soft_id,
			language_pool: options.language_pool.as_deref(),
			callback_url: options.callback_url.as_deref(),
		};
		serde_json::to_value(body).map_err(|err| {
			ApiError::new(ErrorClass::Build, error_codes::BAD_REQUEST, err.to_string())
		})
	}

	async fn poll_with<S: Solution>(
		&self,
		config: &ClientConfig,
		task_id: TaskId,
		cancel: &CancellationToken,
	) -> TaskResult<S> {
		let body = match self.action_body(task_id) {
			Ok(body) => body,
			Err(error) => return TaskResult::failure(Some(task_id), error),
		};
		let response = self.call(config, ApiMethod::GetTaskResult, &body, cancel).await;
		classify_task_result(task_id, response)
	}

	async fn wait_with<S: Solution>(
		&self,
		config: &ClientConfig,
		task_id: TaskId,
		cancel: &CancellationToken,
	) -> TaskResult<S> {
		let started = Instant::now();
		let mut last_status = None;
		let mut polls = 0u32;

		loop {
			if started.elapsed() >= config.max_wait_for_task_result {
				let mut result = TaskResult::failure(
					Some(task_id),
					ApiError::polling_timeout(task_id, config.max_wait_for_task_result),
				);
				result.status = last_status;
				return result;
			}

			polls += 1;
			let result = self.poll_with::<S>(config, task_id, cancel).await;
			self.events.dispatch(TaskEvent::Polled(TaskPolledEvent {
				task_id,
				poll: polls,
				status: result.status,
				elapsed: started.elapsed(),
				timestamp: Utc::now(),
			}));

			if !result.is_processing() {
				return result;
			}
			last_status = result.status;

			tokio::select! {
				biased;
				_ = cancel.cancelled() => {
					let mut cancelled = TaskResult::failure(Some(task_id), ApiError::cancelled());
					cancelled.status = last_status;
					return cancelled;
				}
				_ = sleep(config.poll_interval) => {}
			}
		}
	}

	async fn call(
		&self,
		config: &ClientConfig,
		method: ApiMethod,
		body: &Value,
		cancel: &CancellationToken,
	) -> Result<String, TransportError> {
		if cancel.is_cancelled() {
			return Err(TransportError::Cancelled);
		}
		let url = config
			.endpoint(method)
			.map_err(|err| TransportError::Http(err.to_string()))?;

		tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(TransportError::Cancelled),
			outcome = timeout(config.max_http_request_time, self.transport.post(&url, body)) => {
				outcome.unwrap_or(Err(TransportError::Timeout))
			}
		}
	}

	fn action_body(&self, task_id: TaskId) -> Result<Value, ApiError> {
		serde_json::to_value(TaskActionPayload {
			client_key: &self.client_key,
			task_id,
		})
		.map_err(|err| ApiError::new(ErrorClass::Build, error_codes::BAD_REQUEST, err.to_string()))
	}
}

fn build_failure(err: payload::BuildError) -> ApiError {
	ApiError::new(ErrorClass::Build, error_codes::BAD_REQUEST, err.to_string())
}

fn report_method(outcome: ReportOutcome) -> ApiMethod {
	match outcome {
		ReportOutcome::IncorrectImageCaptcha => ApiMethod::ReportIncorrectImageCaptcha,
		ReportOutcome::IncorrectRecaptcha => ApiMethod::ReportIncorrectRecaptcha,
		ReportOutcome::CorrectRecaptcha => ApiMethod::ReportCorrectRecaptcha,
		ReportOutcome::IncorrectHCaptcha => ApiMethod::ReportIncorrectHCaptcha,
	}
}
