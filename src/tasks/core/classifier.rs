//! Response classification.
//!
//! Every transport outcome, well-formed or not, is folded into the uniform
//! result types from [`super::types`]. Nothing here returns `Err`: a broken
//! body is just another kind of failed result.

use serde::Deserialize;
use serde_json::Value;

use super::transport::TransportError;
use super::types::{
    ActionResult, ApiError, CreateTaskOutcome, ErrorClass, TaskId, TaskMetadata, TaskResult,
    TaskStatus, error_codes,
};
use crate::tasks::solutions::Solution;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorFields {
    #[serde(default)]
    error_id: i64,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorFields {
    fn remote_error(&self) -> Option<ApiError> {
        if self.error_id <= 0 {
            return None;
        }
        let code = self
            .error_code
            .clone()
            .unwrap_or_else(|| error_codes::UNEXPECTED_ERROR.to_string());
        let description = self.error_description.clone().unwrap_or_default();
        Some(ApiError::new(ErrorClass::Protocol, code, description).with_error_id(self.error_id))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskBody {
    #[serde(default)]
    task_id: Option<TaskId>,
    #[serde(flatten)]
    errors: ErrorFields,
}

#[derive(Debug, Deserialize)]
struct TaskResultBody {
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    solution: Option<Value>,
    #[serde(flatten)]
    errors: ErrorFields,
    #[serde(flatten)]
    metadata: TaskMetadata,
}

#[derive(Debug, Deserialize)]
struct ActionBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(flatten)]
    errors: ErrorFields,
}

/// Maps a transport failure onto synthetic error fields.
pub fn transport_failure(error: &TransportError) -> ApiError {
    match error {
        TransportError::Cancelled => ApiError::cancelled(),
        TransportError::Timeout => ApiError::new(
            ErrorClass::Transport,
            error_codes::REQUEST_TIMEOUT,
            error.to_string(),
        ),
        TransportError::Http(_) | TransportError::Status(_) => {
            ApiError::new(ErrorClass::Transport, error_codes::HTTP_ERROR, error.to_string())
        }
    }
}

fn decode_failure(description: impl Into<String>) -> ApiError {
    ApiError::new(ErrorClass::Decode, error_codes::JSON_ERROR, description)
}

/// Classifies the answer to a `createTask` call.
pub fn classify_creation(response: Result<String, TransportError>) -> CreateTaskOutcome {
    let raw = match response {
        Ok(raw) => raw,
        Err(err) => return CreateTaskOutcome::failed(transport_failure(&err)),
    };

    let body: CreateTaskBody = match serde_json::from_str(&raw) {
        Ok(body) => body,
        Err(err) => {
            return CreateTaskOutcome {
                task_id: None,
                error: Some(decode_failure(err.to_string())),
                raw_response: Some(raw),
            };
        }
    };

    let error = if let Some(remote) = body.errors.remote_error() {
        Some(remote)
    } else if body.task_id.is_none() {
        Some(ApiError::new(
            ErrorClass::Decode,
            error_codes::INTERNAL_SERVER_ERROR,
            "createTask response carried neither a task id nor an error",
        ))
    } else {
        None
    };

    CreateTaskOutcome {
        task_id: if error.is_none() { body.task_id } else { None },
        error,
        raw_response: Some(raw),
    }
}

/// Classifies the answer to a `getTaskResult` call for `task_id`.
///
/// The solution is decoded into `S` only when the task is ready.
pub fn classify_task_result<S: Solution>(
    task_id: TaskId,
    response: Result<String, TransportError>,
) -> TaskResult<S> {
    let raw = match response {
        Ok(raw) => raw,
        Err(err) => return TaskResult::failure(Some(task_id), transport_failure(&err)),
    };

    let body: TaskResultBody = match serde_json::from_str(&raw) {
        Ok(body) => body,
        Err(err) => {
            let mut result = TaskResult::failure(Some(task_id), decode_failure(err.to_string()));
            result.raw_response = Some(raw);
            return result;
        }
    };

    let mut result = TaskResult {
        task_id: Some(task_id),
        status: body.status,
        solution: None,
        error: None,
        metadata: body.metadata,
        raw_response: None,
    };

    if let Some(remote) = body.errors.remote_error() {
        result.status = Some(TaskStatus::Error);
        result.error = Some(remote);
    } else {
        match body.status {
            None => {
                result.error = Some(ApiError::new(
                    ErrorClass::Decode,
                    error_codes::INTERNAL_SERVER_ERROR,
                    "getTaskResult response did not include a status",
                ));
            }
            Some(TaskStatus::Error) => {
                let code = body
                    .errors
                    .error_code
                    .unwrap_or_else(|| error_codes::UNEXPECTED_ERROR.to_string());
                result.error = Some(ApiError::new(
                    ErrorClass::Protocol,
                    code,
                    body.errors.error_description.unwrap_or_default(),
                ));
            }
            Some(TaskStatus::Processing) => {}
            Some(TaskStatus::Ready) => match body.solution {
                Some(value) => match serde_json::from_value::<S>(value) {
                    Ok(solution) => {
                        if !solution.is_valid() {
                            log::warn!("task {task_id} is ready but its solution looks incomplete");
                        }
                        result.solution = Some(solution);
                    }
                    Err(err) => {
                        result.status = None;
                        result.error = Some(decode_failure(format!(
                            "failed to decode solution for task {task_id}: {err}"
                        )));
                    }
                },
                None => {
                    result.status = None;
                    result.error = Some(decode_failure(format!(
                        "task {task_id} is ready but carried no solution"
                    )));
                }
            },
        }
    }

    result.raw_response = Some(raw);
    result
}

/// Classifies the answer to a report call.
pub fn classify_action(response: Result<String, TransportError>) -> ActionResult {
    let raw = match response {
        Ok(raw) => raw,
        Err(err) => return ActionResult::failed(transport_failure(&err)),
    };

    match serde_json::from_str::<ActionBody>(&raw) {
        Ok(body) => ActionResult {
            error: body.errors.remote_error(),
            status: body.status,
            raw_response: Some(raw),
        },
        Err(err) => ActionResult {
            status: None,
            error: Some(decode_failure(err.to_string())),
            raw_response: Some(raw),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::solutions::TurnstileSolution;

    fn ok(body: &str) -> Result<String, TransportError> {
        Ok(body.to_string())
    }

    #[test]
    fn creation_with_task_id_succeeds() {
        let outcome = classify_creation(ok(r#"{"errorId":0,"taskId":7654321}"#));
        assert!(outcome.is_created());
        assert_eq!(outcome.task_id, Some(7654321));
    }

    #[test]
    fn creation_rejected_by_service_keeps_remote_fields() {
        let outcome = classify_creation(ok(
            r#"{"errorId":1,"errorCode":"ERROR_KEY_DOES_NOT_EXIST","errorDescription":"Account authorization key not found"}"#,
        ));
        let error = outcome.error.unwrap();
        assert_eq!(error.class, ErrorClass::Protocol);
        assert_eq!(error.error_id, Some(1));
        assert_eq!(error.code, "ERROR_KEY_DOES_NOT_EXIST");
        assert!(outcome.task_id.is_none());
    }

    #[test]
    fn malformed_body_becomes_json_error() {
        let outcome = classify_creation(ok("<html>bad gateway</html>"));
        let error = outcome.error.unwrap();
        assert_eq!(error.code, error_codes::JSON_ERROR);
        assert_eq!(error.class, ErrorClass::Decode);
        assert_eq!(outcome.raw_response.as_deref(), Some("<html>bad gateway</html>"));
    }

    #[test]
    fn transport_failures_use_synthetic_codes() {
        let outcome = classify_creation(Err(TransportError::Status(502)));
        assert_eq!(outcome.error.unwrap().code, error_codes::HTTP_ERROR);

        let result: TaskResult<Value> = classify_task_result(1, Err(TransportError::Cancelled));
        assert_eq!(result.error_class(), Some(ErrorClass::Cancelled));
        assert_eq!(result.error_code(), Some(error_codes::CANCELLED));
    }

    #[test]
    fn ready_result_decodes_typed_solution_and_metadata() {
        let result: TaskResult<TurnstileSolution> = classify_task_result(
            9,
            ok(r#"{"errorId":0,"status":"ready","solution":{"token":"0.abc","userAgent":"UA"},"cost":"0.00120","ip":"46.98.54.221","createTime":1692863536,"endTime":1692863556,"solveCount":1}"#),
        );
        assert!(result.is_ready());
        assert_eq!(result.solution.as_ref().unwrap().token, "0.abc");
        assert_eq!(result.metadata.cost.as_deref(), Some("0.00120"));
        assert_eq!(result.metadata.end_time, Some(1692863556));
    }

    #[test]
    fn processing_result_has_no_error_or_solution() {
        let result: TaskResult<Value> = classify_task_result(9, ok(r#"{"status":"processing"}"#));
        assert!(result.is_processing());
        assert!(result.solution.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn remote_error_without_status_is_error_status() {
        let result: TaskResult<Value> = classify_task_result(
            9,
            ok(r#"{"errorId":12,"errorCode":"ERROR_CAPTCHA_UNSOLVABLE","errorDescription":"Captcha could not be solved by 5 different workers"}"#),
        );
        assert_eq!(result.status, Some(TaskStatus::Error));
        assert_eq!(result.error_class(), Some(ErrorClass::Protocol));
    }

    #[test]
    fn missing_status_without_error_is_internal_server_error() {
        let result: TaskResult<Value> = classify_task_result(9, ok(r#"{"errorId":0}"#));
        assert_eq!(result.error_code(), Some(error_codes::INTERNAL_SERVER_ERROR));
        assert!(result.status.is_none());
    }

    #[test]
    fn unknown_status_is_a_decode_failure() {
        let result: TaskResult<Value> = classify_task_result(9, ok(r#"{"status":"queued"}"#));
        assert_eq!(result.error_code(), Some(error_codes::JSON_ERROR));
    }

    #[test]
    fn ready_with_wrong_solution_shape_is_a_decode_failure() {
        let result: TaskResult<TurnstileSolution> =
            classify_task_result(9, ok(r#"{"status":"ready","solution":{"text":"abc"}}"#));
        assert_eq!(result.error_class(), Some(ErrorClass::Decode));
        assert!(result.solution.is_none());
    }

    #[test]
    fn action_result_reports_status() {
        let result = classify_action(ok(r#"{"errorId":0,"status":"success"}"#));
        assert!(result.is_success());
        assert_eq!(result.status.as_deref(), Some("success"));
    }
}
