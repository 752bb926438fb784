//! Field validation for outgoing tasks.
//!
//! Validators run over the projected wire fields of a request, so every error
//! names the field exactly as the service would see it. A validator never
//! stops at the first failure: the full set of problems is collected and
//! reported together.

use std::fmt;

use base64::{Engine, engine::general_purpose};
use serde_json::{Map, Value};

use super::catalog;
use super::payload;
use super::requests::CaptchaRequest;

/// Upper bound used for "non-negative" integer checks.
const MAX_LENGTH_HINT: f64 = u32::MAX as f64;

/// One field-level problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Ordered collection of validation errors; empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(field, message));
    }

    /// Whether any error names `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// All messages joined by newlines, as carried in a `BadRequest` result.
    pub fn to_message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

/// A single check applied to the projected fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Field must be present and, for strings, non-empty.
    Required(&'static str),
    /// A proxy must be attached and structurally complete.
    ProxyRequired,
    /// If a proxy is attached it must be structurally complete.
    Proxy,
    /// Numeric field, when present, must lie within `min..=max`.
    Range {
        field: &'static str,
        min: f64,
        max: f64,
    },
    /// Numeric field, when present, must equal one of `allowed`.
    OneOf {
        field: &'static str,
        allowed: &'static [f64],
    },
    /// Numeric field, when present and non-zero, must be at least `sibling`.
    NotLessThan {
        field: &'static str,
        sibling: &'static str,
    },
    /// String field, when present, must be clean base64.
    Base64(&'static str),
}

impl Rule {
    fn apply(&self, fields: &Map<String, Value>, result: &mut ValidationResult) {
        match *self {
            Rule::Required(field) => {
                if is_blank(fields.get(field)) {
                    result.push(field, "is required");
                }
            }
            Rule::ProxyRequired => match fields.get(payload::PROXY_FIELD) {
                Some(Value::Object(proxy)) => check_proxy(proxy, result),
                _ => result.push(payload::PROXY_FIELD, "is required for proxied tasks"),
            },
            Rule::Proxy => {
                if let Some(Value::Object(proxy)) = fields.get(payload::PROXY_FIELD) {
                    check_proxy(proxy, result);
                }
            }
            Rule::Range { field, min, max } => {
                if let Some(value) = present(fields.get(field)) {
                    match value.as_f64() {
                        Some(number) if number >= min && number <= max => {}
                        Some(_) => result.push(field, format!("must be between {min} and {max}")),
                        None => result.push(field, "must be a number"),
                    }
                }
            }
            Rule::OneOf { field, allowed } => {
                if let Some(value) = present(fields.get(field)) {
                    let matches = value
                        .as_f64()
                        .is_some_and(|number| allowed.iter().any(|candidate| (candidate - number).abs() < f64::EPSILON));
                    if !matches {
                        let options = allowed
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ");
                        result.push(field, format!("must be one of: {options}"));
                    }
                }
            }
            Rule::NotLessThan { field, sibling } => {
                let value = present(fields.get(field)).and_then(Value::as_f64);
                let other = present(fields.get(sibling)).and_then(Value::as_f64);
                if let (Some(value), Some(other)) = (value, other)
                    && value != 0.0
                    && value < other
                {
                    result.push(field, format!("must not be less than {sibling}"));
                }
            }
            Rule::Base64(field) => {
                if let Some(Value::String(text)) = present(fields.get(field)) {
                    if text.starts_with("data:") {
                        result.push(field, "must not include a data URI prefix");
                    } else if general_purpose::STANDARD.decode(text.as_bytes()).is_err() {
                        result.push(field, "must be valid base64");
                    }
                }
            }
        }
    }
}

/// Ordered rule groups for one task kind: base rules first, then the
/// variant-specific ones.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    groups: &'static [&'static [Rule]],
}

impl Validator {
    pub const fn new(groups: &'static [&'static [Rule]]) -> Self {
        Self { groups }
    }

    pub fn rules(&self) -> impl Iterator<Item = &'static Rule> {
        self.groups.iter().flat_map(|group| group.iter())
    }

    /// Runs every rule against `fields` and returns all failures.
    pub fn check(&self, fields: &Map<String, Value>) -> ValidationResult {
        let mut result = ValidationResult::new();
        for rule in self.rules() {
            rule.apply(fields, &mut result);
        }
        result
    }
}

/// Validates `request` with the validator its kind is registered with.
///
/// A request that cannot even be projected to wire fields is reported as a
/// single error against `task`.
pub fn validate<R: CaptchaRequest>(request: &R) -> ValidationResult {
    match payload::project(request) {
        Ok(fields) => catalog::resolve(request.kind()).validator.check(&fields),
        Err(err) => {
            let mut result = ValidationResult::new();
            result.push("task", err.to_string());
            result
        }
    }
}

pub(crate) mod rules {
    use super::{MAX_LENGTH_HINT, Rule};

    pub const SITE: &[Rule] = &[Rule::Required("websiteURL"), Rule::Required("websiteKey")];
    pub const PROXIED: &[Rule] = &[Rule::Required("userAgent"), Rule::ProxyRequired];
    pub const OPTIONAL_PROXY: &[Rule] = &[Rule::Proxy];

    pub const IMAGE_TO_TEXT: &[Rule] = &[
        Rule::Required("body"),
        Rule::Base64("body"),
        Rule::Range {
            field: "minLength",
            min: 0.0,
            max: MAX_LENGTH_HINT,
        },
        Rule::Range {
            field: "maxLength",
            min: 0.0,
            max: MAX_LENGTH_HINT,
        },
        Rule::NotLessThan {
            field: "maxLength",
            sibling: "minLength",
        },
    ];
    pub const IMAGE_TO_COORDINATES: &[Rule] = &[Rule::Required("body"), Rule::Base64("body")];
    pub const RECAPTCHA_V3: &[Rule] = &[
        Rule::Required("minScore"),
        Rule::OneOf {
            field: "minScore",
            allowed: &[0.3, 0.7, 0.9],
        },
    ];
    pub const FUNCAPTCHA: &[Rule] = &[
        Rule::Required("websiteURL"),
        Rule::Required("websitePublicKey"),
    ];
    pub const GEETEST_V3: &[Rule] = &[
        Rule::Required("websiteURL"),
        Rule::Required("gt"),
        Rule::Required("challenge"),
    ];
    pub const GEETEST_V4: &[Rule] = &[Rule::Required("websiteURL"), Rule::Required("gt")];
    pub const AMAZON_WAF: &[Rule] = &[Rule::Required("iv"), Rule::Required("context")];
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

fn is_blank(value: Option<&Value>) -> bool {
    match present(value) {
        None => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

fn check_proxy(proxy: &Map<String, Value>, result: &mut ValidationResult) {
    if is_blank(proxy.get("proxyType")) {
        result.push("proxyType", "is required");
    }
    if is_blank(proxy.get("proxyAddress")) {
        result.push("proxyAddress", "is required");
    }
    match present(proxy.get("proxyPort")).map(Value::as_u64) {
        None => result.push("proxyPort", "is required"),
        Some(Some(port)) if (1..=65535).contains(&port) => {}
        Some(_) => result.push("proxyPort", "must be between 1 and 65535"),
    }
    if !is_blank(proxy.get("proxyPassword")) && is_blank(proxy.get("proxyLogin")) {
        result.push("proxyLogin", "is required when proxyPassword is set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test fixtures are objects"),
        }
    }

    #[test]
    fn collects_every_failure_in_rule_order() {
        let validator = Validator::new(&[rules::SITE, rules::PROXIED]);
        let result = validator.check(&Map::new());
        let names: Vec<_> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(names, ["websiteURL", "websiteKey", "userAgent", "proxyConfig"]);
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let validator = Validator::new(&[rules::SITE]);
        let result = validator.check(&fields(json!({"websiteURL": "  ", "websiteKey": "k"})));
        assert!(result.mentions("websiteURL"));
        assert!(!result.mentions("websiteKey"));
    }

    #[test]
    fn proxy_credentials_are_optional_but_password_needs_login() {
        let validator = Validator::new(&[rules::OPTIONAL_PROXY]);
        let complete = fields(json!({"proxyConfig": {
            "proxyType": "http", "proxyAddress": "10.0.0.1", "proxyPort": 8080
        }}));
        assert!(validator.check(&complete).is_valid());

        let password_only = fields(json!({"proxyConfig": {
            "proxyType": "http", "proxyAddress": "10.0.0.1", "proxyPort": 8080,
            "proxyPassword": "secret"
        }}));
        assert!(validator.check(&password_only).mentions("proxyLogin"));
    }

    #[test]
    fn incomplete_proxy_names_each_missing_part() {
        let validator = Validator::new(&[rules::OPTIONAL_PROXY]);
        let result = validator.check(&fields(json!({"proxyConfig": {"proxyPort": 0}})));
        assert!(result.mentions("proxyType"));
        assert!(result.mentions("proxyAddress"));
        assert!(result.mentions("proxyPort"));
    }

    #[test]
    fn base64_rejects_data_uri_and_garbage() {
        let validator = Validator::new(&[rules::IMAGE_TO_COORDINATES]);
        let data_uri = validator.check(&fields(json!({"body": "data:image/png;base64,AAAA"})));
        assert_eq!(data_uri.errors()[0].message, "must not include a data URI prefix");

        let garbage = validator.check(&fields(json!({"body": "%%%"})));
        assert_eq!(garbage.errors()[0].message, "must be valid base64");

        assert!(validator.check(&fields(json!({"body": "aGVsbG8="}))).is_valid());
    }

    #[test]
    fn max_length_may_not_undercut_min_length() {
        let validator = Validator::new(&[rules::IMAGE_TO_TEXT]);
        let result = validator.check(&fields(json!({"body": "aGVsbG8=", "minLength": 5, "maxLength": 3})));
        assert!(result.mentions("maxLength"));

        let unbounded = validator.check(&fields(json!({"body": "aGVsbG8=", "minLength": 5, "maxLength": 0})));
        assert!(unbounded.is_valid());

        let negative = validator.check(&fields(json!({"body": "aGVsbG8=", "minLength": -1})));
        assert!(negative.mentions("minLength"));
    }

    #[test]
    fn min_score_must_be_a_supported_value() {
        let validator = Validator::new(&[rules::RECAPTCHA_V3]);
        assert!(validator.check(&fields(json!({"minScore": 0.5}))).mentions("minScore"));
        assert!(validator.check(&fields(json!({"minScore": 0.7}))).is_valid());
        assert!(validator.check(&Map::new()).mentions("minScore"));
    }

    #[test]
    fn message_joins_errors_with_newlines() {
        let validator = Validator::new(&[rules::SITE]);
        let message = validator.check(&Map::new()).to_message();
        assert_eq!(message, "websiteURL is required\nwebsiteKey is required");
    }
}
