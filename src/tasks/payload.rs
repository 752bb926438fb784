//! Wire payload construction.
//!
//! A request is first projected into a generic JSON object; the task type,
//! version/enterprise markers and the flattened proxy fields are then applied
//! according to its catalog entry. The service does not accept a nested proxy
//! object, so `proxyConfig` never survives into the final payload.

use serde_json::{Map, Value};
use thiserror::Error;

use super::catalog::{self, PayloadRule, TaskKind};
use super::requests::CaptchaRequest;

/// Key under which requests serialize their proxy before flattening.
pub const PROXY_FIELD: &str = "proxyConfig";

const PROXY_KEYS: [&str; 5] = [
    "proxyType",
    "proxyAddress",
    "proxyPort",
    "proxyLogin",
    "proxyPassword",
];

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to serialize {kind:?} request: {source}")]
    Serialization {
        kind: TaskKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0:?} request did not serialize to a JSON object")]
    NotAnObject(TaskKind),
    #[error("{0:?} request carries a malformed proxy configuration")]
    MalformedProxy(TaskKind),
}

/// Projects every set field of `request` into a JSON object.
pub fn project<R: CaptchaRequest>(request: &R) -> Result<Map<String, Value>, BuildError> {
    let kind = request.kind();
    let value =
        serde_json::to_value(request).map_err(|source| BuildError::Serialization { kind, source })?;

    match value {
        Value::Object(mut fields) => {
            fields.retain(|_, value| !value.is_null());
            Ok(fields)
        }
        _ => Err(BuildError::NotAnObject(kind)),
    }
}

/// Applies the catalog rules for `kind` to projected fields.
pub fn finalize(kind: TaskKind, mut fields: Map<String, Value>) -> Result<Map<String, Value>, BuildError> {
    let entry = catalog::resolve(kind);
    fields.insert("type".into(), Value::from(entry.task_type));

    match entry.payload_rule {
        PayloadRule::None => {}
        PayloadRule::Version(version) => {
            fields.insert("version".into(), Value::from(version));
        }
        PayloadRule::Enterprise => {
            fields.insert("isEnterprise".into(), Value::Bool(true));
        }
    }

    match fields.remove(PROXY_FIELD) {
        None | Some(Value::Null) => {}
        Some(Value::Object(proxy)) => flatten_proxy(kind, proxy, &mut fields)?,
        Some(_) => return Err(BuildError::MalformedProxy(kind)),
    }

    Ok(fields)
}

/// Builds the complete `task` object for `request`.
pub fn build<R: CaptchaRequest>(request: &R) -> Result<Map<String, Value>, BuildError> {
    finalize(request.kind(), project(request)?)
}

fn flatten_proxy(
    kind: TaskKind,
    mut proxy: Map<String, Value>,
    fields: &mut Map<String, Value>,
) -> Result<(), BuildError> {
    for key in PROXY_KEYS {
        let value = match proxy.remove(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(text)) if text.is_empty() => continue,
            Some(Value::String(text)) if key == "proxyType" => Value::String(text.to_lowercase()),
            Some(value @ (Value::String(_) | Value::Number(_))) => value,
            Some(_) => return Err(BuildError::MalformedProxy(kind)),
        };
        fields.insert(key.to_string(), value);
    }
    Ok(())
}
