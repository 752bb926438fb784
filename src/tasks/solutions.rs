//! Solution payloads returned by the service once a task is ready.
//!
//! Each request type names its solution through
//! [`CaptchaRequest::Solution`](crate::tasks::requests::CaptchaRequest), so the
//! classifier always knows which shape to decode.

use std::collections::HashMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded solution.
pub trait Solution: DeserializeOwned + Debug + Clone + Send + Sync + 'static {
    /// Whether the payload carries the fields a caller needs to use it.
    fn is_valid(&self) -> bool;
}

impl Solution for Value {
    fn is_valid(&self) -> bool {
        !self.is_null()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageToTextSolution {
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Solution for ImageToTextSolution {
    fn is_valid(&self) -> bool {
        !self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageToCoordinatesSolution {
    #[serde(default)]
    pub coordinates: Vec<Vec<i32>>,
}

impl Solution for ImageToCoordinatesSolution {
    fn is_valid(&self) -> bool {
        !self.coordinates.is_empty()
    }
}

/// Shared by every reCAPTCHA flavour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaSolution {
    pub g_recaptcha_response: String,
    #[serde(default)]
    pub cookies: Option<HashMap<String, String>>,
}

impl Solution for RecaptchaSolution {
    fn is_valid(&self) -> bool {
        !self.g_recaptcha_response.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunCaptchaSolution {
    pub token: String,
}

impl Solution for FunCaptchaSolution {
    fn is_valid(&self) -> bool {
        !self.token.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeeTestV3Solution {
    pub challenge: String,
    pub validate: String,
    pub seccode: String,
}

impl Solution for GeeTestV3Solution {
    fn is_valid(&self) -> bool {
        !self.challenge.is_empty() && !self.validate.is_empty() && !self.seccode.is_empty()
    }
}

/// GeeTest v4 answers use snake_case keys on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeeTestV4Solution {
    pub captcha_id: String,
    pub lot_number: String,
    pub pass_token: String,
    pub gen_time: String,
    pub captcha_output: String,
}

impl Solution for GeeTestV4Solution {
    fn is_valid(&self) -> bool {
        [
            &self.captcha_id,
            &self.lot_number,
            &self.pass_token,
            &self.gen_time,
            &self.captcha_output,
        ]
        .iter()
        .all(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnstileSolution {
    pub token: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Solution for TurnstileSolution {
    fn is_valid(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Token answer shared by Prosopo and FriendlyCaptcha; same shape as Turnstile.
pub type TokenSolution = TurnstileSolution;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmazonWafSolution {
    pub token: String,
}

impl Solution for AmazonWafSolution {
    fn is_valid(&self) -> bool {
        !self.token.is_empty()
    }
}
