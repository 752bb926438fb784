use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anticaptcha_rs::{
    AntiCaptchaClient, CancellationToken, ClientConfig, ErrorClass, ReportOutcome, TaskOptions,
    TaskOutcome, TaskStatus, TaskTransport, TransportError, TurnstileRequest, TurnstileSolution,
    error_codes,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::time::{Instant, sleep};
use url::Url;

type Scripted = Result<String, TransportError>;

/// Transport that replays scripted responses and records every call.
#[derive(Default)]
struct StubTransport {
    responses: Mutex<VecDeque<Scripted>>,
    fallback: Option<Value>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl StubTransport {
    fn scripted(responses: Vec<Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    /// Served once the script runs dry.
    fn with_fallback(mut self, body: Value) -> Self {
        self.fallback = Some(body);
        self
    }

    fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path == method)
            .count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_body(&self) -> Value {
        self.calls.lock().unwrap().last().unwrap().1.clone()
    }
}

#[async_trait]
impl TaskTransport for StubTransport {
    async fn post(&self, url: &Url, body: &Value) -> Result<String, TransportError> {
        let method = url.path().trim_start_matches('/').to_string();
        self.calls.lock().unwrap().push((method, body.clone()));
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(body) => Ok(body.to_string()),
            None => Err(TransportError::Http("script exhausted".into())),
        }
    }
}

/// Transport whose calls never complete.
struct HangingTransport;

#[async_trait]
impl TaskTransport for HangingTransport {
    async fn post(&self, _url: &Url, _body: &Value) -> Result<String, TransportError> {
        std::future::pending().await
    }
}

fn ok(body: Value) -> Scripted {
    Ok(body.to_string())
}

fn created(task_id: i64) -> Scripted {
    ok(json!({"errorId": 0, "taskId": task_id}))
}

fn processing() -> Scripted {
    ok(json!({"errorId": 0, "status": "processing"}))
}

fn ready(token: &str) -> Scripted {
    ok(json!({
        "errorId": 0,
        "status": "ready",
        "solution": {"token": token, "userAgent": "Mozilla/5.0"},
        "cost": "0.00120",
        "solveCount": 0
    }))
}

fn remote_error(code: &str) -> Scripted {
    ok(json!({"errorId": 12, "status": "error", "errorCode": code, "errorDescription": "worker failure"}))
}

fn config(attempts: u32) -> ClientConfig {
    ClientConfig::default()
        .with_poll_interval(Duration::from_millis(1000))
        .with_max_wait(Duration::from_millis(5000))
        .with_http_timeout(Duration::from_secs(10))
        .with_solve_attempts(attempts)
}

fn client(transport: Arc<StubTransport>, config: ClientConfig) -> AntiCaptchaClient {
    AntiCaptchaClient::builder("test-key")
        .with_config(config)
        .with_transport(transport)
        .build()
        .unwrap()
}

fn request() -> TurnstileRequest {
    TurnstileRequest::new("https://example.com/login", "0x4AAAAAAA")
}

#[tokio::test(start_paused = true)]
async fn invalid_request_returns_immediately_without_network() {
    let transport = Arc::new(StubTransport::default());
    let client = client(transport.clone(), config(3));

    let result = client
        .solve(&TurnstileRequest::new("", ""), &TaskOptions::default())
        .await;

    assert_eq!(transport.total_calls(), 0);
    assert!(result.task_id.is_none());
    assert_eq!(result.error_code(), Some(error_codes::BAD_REQUEST));
    assert_eq!(result.error_class(), Some(ErrorClass::Validation));
    let description = &result.error.as_ref().unwrap().description;
    assert!(description.contains("websiteURL"));
    assert!(description.contains("websiteKey"));
}

#[tokio::test(start_paused = true)]
async fn processing_twice_then_ready_waits_two_intervals() {
    let transport = Arc::new(StubTransport::scripted(vec![
        created(101),
        processing(),
        processing(),
        ready("0.token"),
    ]));
    let client = client(transport.clone(), config(1));

    let started = Instant::now();
    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert_eq!(started.elapsed(), Duration::from_millis(2000));
    assert_eq!(transport.calls_to("getTaskResult"), 3);
    assert!(result.is_ready());
    assert_eq!(result.task_id, Some(101));
    let solution: &TurnstileSolution = result.solution.as_ref().unwrap();
    assert_eq!(solution.token, "0.token");
    assert_eq!(result.metadata.cost.as_deref(), Some("0.00120"));
}

#[tokio::test(start_paused = true)]
async fn endless_processing_times_out_after_five_polls() {
    let transport = Arc::new(
        StubTransport::scripted(vec![created(7)])
            .with_fallback(json!({"errorId": 0, "status": "processing"})),
    );
    let client = client(transport.clone(), config(3));

    let started = Instant::now();
    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert_eq!(transport.calls_to("getTaskResult"), 5);
    assert_eq!(transport.calls_to("createTask"), 1, "timeouts are not retried");
    assert_eq!(started.elapsed(), Duration::from_millis(5000));
    assert_eq!(result.outcome(), TaskOutcome::TimedOut);
    assert_eq!(result.status, Some(TaskStatus::Processing));
    let error = result.error.as_ref().unwrap();
    assert_eq!(error.code, error_codes::REQUEST_TIMEOUT);
    assert!(error.description.contains("5000 ms"));
}

#[tokio::test(start_paused = true)]
async fn remote_error_is_retried_with_a_new_task() {
    let transport = Arc::new(StubTransport::scripted(vec![
        created(1),
        remote_error("ERROR_CAPTCHA_UNSOLVABLE"),
        created(2),
        ready("second"),
    ]));
    let client = client(transport.clone(), config(2));

    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert_eq!(transport.calls_to("createTask"), 2);
    assert!(result.is_ready());
    assert_eq!(result.task_id, Some(2));
    assert!(result.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_return_the_last_cycle() {
    let transport = Arc::new(StubTransport::scripted(vec![
        created(1),
        remote_error("ERR_FIRST"),
        created(2),
        remote_error("ERR_SECOND"),
        created(3),
        remote_error("ERR_THIRD"),
        created(4),
        ready("never reached"),
    ]));
    let client = client(transport.clone(), config(3));

    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert_eq!(transport.calls_to("createTask"), 3);
    assert_eq!(result.outcome(), TaskOutcome::Error);
    assert_eq!(result.task_id, Some(3));
    assert_eq!(result.error_code(), Some("ERR_THIRD"));
}

#[tokio::test(start_paused = true)]
async fn later_ready_cycle_is_not_shadowed_by_earlier_creation_error() {
    let transport = Arc::new(StubTransport::scripted(vec![
        ok(json!({
            "errorId": 21,
            "errorCode": "ERROR_NO_SLOT_AVAILABLE",
            "errorDescription": "No idle workers are available at the moment"
        })),
        created(55),
        ready("fresh"),
    ]));
    let client = client(transport.clone(), config(2));

    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert_eq!(result.outcome(), TaskOutcome::Ready);
    assert_eq!(result.task_id, Some(55));
    assert!(result.error.is_none());
    assert_eq!(result.solution.unwrap().token, "fresh");
    assert!(!result.raw_response.unwrap().contains("ERROR_NO_SLOT_AVAILABLE"));
}

#[tokio::test(start_paused = true)]
async fn creation_transport_failure_is_retried() {
    let transport = Arc::new(StubTransport::scripted(vec![
        Err(TransportError::Status(502)),
        created(9),
        ready("ok"),
    ]));
    let client = client(transport.clone(), config(2));

    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert!(result.is_ready());
    assert_eq!(transport.calls_to("createTask"), 2);
}

#[tokio::test(start_paused = true)]
async fn creation_failure_on_every_attempt_keeps_its_error_fields() {
    let transport = Arc::new(StubTransport::scripted(vec![
        Err(TransportError::Http("connection reset".into())),
        Err(TransportError::Http("connection reset".into())),
    ]));
    let client = client(transport.clone(), config(2));

    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert!(result.task_id.is_none());
    assert!(result.status.is_none());
    assert_eq!(result.error_code(), Some(error_codes::HTTP_ERROR));
    assert_eq!(result.outcome(), TaskOutcome::Failed);
}

#[tokio::test(start_paused = true)]
async fn malformed_poll_response_ends_the_cycle() {
    let transport = Arc::new(StubTransport::scripted(vec![
        created(3),
        ok(json!({"status": "queued"})),
        created(4),
    ]));
    let client = client(transport.clone(), config(3));

    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert_eq!(transport.calls_to("createTask"), 1);
    assert_eq!(result.error_code(), Some(error_codes::JSON_ERROR));
    assert_eq!(result.error_class(), Some(ErrorClass::Decode));
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_the_poll_wait() {
    let transport = Arc::new(
        StubTransport::scripted(vec![created(5)])
            .with_fallback(json!({"errorId": 0, "status": "processing"})),
    );
    let config = config(1)
        .with_poll_interval(Duration::from_secs(10))
        .with_max_wait(Duration::from_secs(120));
    let client = client(transport.clone(), config);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = client
        .solve_with_cancellation(&request(), &TaskOptions::default(), &cancel)
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(transport.calls_to("getTaskResult"), 1);
    assert_eq!(result.error_class(), Some(ErrorClass::Cancelled));
    assert_eq!(result.error_code(), Some(error_codes::CANCELLED));
    assert_eq!(result.task_id, Some(5));
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_token_makes_no_calls() {
    let transport = Arc::new(StubTransport::scripted(vec![created(1)]));
    let client = client(transport.clone(), config(3));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client
        .solve_with_cancellation(&request(), &TaskOptions::default(), &cancel)
        .await;

    assert_eq!(transport.total_calls(), 0);
    assert_eq!(result.error_class(), Some(ErrorClass::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn hanging_transport_hits_the_http_timeout() {
    let client = AntiCaptchaClient::builder("test-key")
        .with_config(config(1).with_http_timeout(Duration::from_secs(3)))
        .with_transport(Arc::new(HangingTransport))
        .build()
        .unwrap();

    let started = Instant::now();
    let result = client
        .get_task_result::<TurnstileSolution>(77, &CancellationToken::new())
        .await;

    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(result.error_code(), Some(error_codes::REQUEST_TIMEOUT));
    assert_eq!(result.error_class(), Some(ErrorClass::Transport));
}

#[tokio::test(start_paused = true)]
async fn create_task_sends_wrapped_payload() {
    let transport = Arc::new(StubTransport::scripted(vec![created(31)]));
    let client = client(transport.clone(), config(1).with_soft_id(802));

    let outcome = client
        .create_task(
            &request().with_action("login"),
            &TaskOptions::new().with_language_pool("en"),
            &CancellationToken::new(),
        )
        .await;

    assert!(outcome.is_created());
    assert_eq!(outcome.task_id, Some(31));
    let body = transport.last_body();
    assert_eq!(body["clientKey"], "test-key");
    assert_eq!(body["softId"], 802);
    assert_eq!(body["languagePool"], "en");
    assert_eq!(body["task"]["type"], "TurnstileTaskProxyless");
    assert_eq!(body["task"]["action"], "login");
}

#[tokio::test(start_paused = true)]
async fn report_outcome_posts_to_matching_endpoint() {
    let transport = Arc::new(StubTransport::scripted(vec![
        ok(json!({"errorId": 0, "status": "success"})),
        ok(json!({"errorId": 16, "errorCode": "ERROR_NO_SUCH_CAPCHA_ID", "errorDescription": "Task not found"})),
    ]));
    let client = client(transport.clone(), config(1));
    let cancel = CancellationToken::new();

    let accepted = client
        .report_task_outcome(12, ReportOutcome::IncorrectRecaptcha, &cancel)
        .await;
    assert!(accepted.is_success());
    assert_eq!(transport.calls_to("reportIncorrectRecaptcha"), 1);
    assert_eq!(transport.last_body()["taskId"], 12);

    let rejected = client
        .report_task_outcome(13, ReportOutcome::IncorrectImageCaptcha, &cancel)
        .await;
    assert_eq!(transport.calls_to("reportIncorrectImageCaptcha"), 1);
    assert_eq!(rejected.error.unwrap().code, "ERROR_NO_SUCH_CAPCHA_ID");
}

#[tokio::test(start_paused = true)]
async fn configure_applies_to_subsequent_calls() {
    let transport = Arc::new(
        StubTransport::scripted(vec![created(1)])
            .with_fallback(json!({"errorId": 0, "status": "processing"})),
    );
    let client = client(transport.clone(), config(1));
    client
        .configure(config(1).with_max_wait(Duration::from_millis(2000)))
        .unwrap();

    let result = client.solve(&request(), &TaskOptions::default()).await;

    assert!(result.is_timed_out());
    assert_eq!(transport.calls_to("getTaskResult"), 2);
}

#[tokio::test(start_paused = true)]
async fn metrics_track_retries_and_outcomes() {
    let transport = Arc::new(StubTransport::scripted(vec![
        created(1),
        remote_error("ERROR_CAPTCHA_UNSOLVABLE"),
        created(2),
        ready("tok"),
    ]));
    let client = client(transport, config(2));

    client.solve(&request(), &TaskOptions::default()).await;

    let snapshot = client.metrics().snapshot();
    let stats = snapshot
        .task_types
        .iter()
        .find(|stats| stats.task_type == "TurnstileTaskProxyless")
        .unwrap();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.ready, 1);
    assert_eq!(snapshot.global.completed, 1);
}
