use std::io;
use std::path::Path;

use base64::{Engine, engine::general_purpose};
use serde::{Serialize, Serializer};

use super::CaptchaRequest;
use crate::tasks::catalog::TaskKind;
use crate::tasks::solutions::{ImageToCoordinatesSolution, ImageToTextSolution};

/// Restriction on digits in an image-text answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericOption {
    #[default]
    NoRequirements,
    NumbersOnly,
    LettersOnly,
}

impl Serialize for NumericOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let code = match self {
            NumericOption::NoRequirements => 0,
            NumericOption::NumbersOnly => 1,
            NumericOption::LettersOnly => 2,
        };
        serializer.serialize_u8(code)
    }
}

/// Classic image captcha: the worker types the text it sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageToTextRequest {
    /// Clean base64, without a data URI prefix.
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrase: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub math: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "websiteURL", skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}

impl ImageToTextRequest {
    pub fn new(body_base64: impl Into<String>) -> Self {
        Self {
            body: body_base64.into(),
            phrase: None,
            case: None,
            numeric: None,
            math: None,
            min_length: None,
            max_length: None,
            comment: None,
            website_url: None,
        }
    }

    pub fn from_image_bytes(bytes: &[u8]) -> Self {
        Self::new(general_purpose::STANDARD.encode(bytes))
    }

    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_image_bytes(&bytes))
    }

    pub fn with_phrase(mut self, phrase: bool) -> Self {
        self.phrase = Some(phrase);
        self
    }

    pub fn with_case_sensitive(mut self, case: bool) -> Self {
        self.case = Some(case);
        self
    }

    pub fn with_numeric(mut self, numeric: NumericOption) -> Self {
        self.numeric = Some(numeric);
        self
    }

    pub fn with_math(mut self, math: bool) -> Self {
        self.math = Some(math);
        self
    }

    /// Answer length bounds; `0` means no requirement on that side.
    pub fn with_length(mut self, min: i32, max: i32) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_website_url(mut self, url: impl Into<String>) -> Self {
        self.website_url = Some(url.into());
        self
    }
}

impl CaptchaRequest for ImageToTextRequest {
    type Solution = ImageToTextSolution;

    fn kind(&self) -> TaskKind {
        TaskKind::ImageToText
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatesMode {
    Points,
    Rectangles,
}

/// Image where the worker marks objects instead of typing text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageToCoordinatesRequest {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CoordinatesMode>,
    #[serde(rename = "websiteURL", skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}

impl ImageToCoordinatesRequest {
    pub fn new(body_base64: impl Into<String>) -> Self {
        Self {
            body: body_base64.into(),
            comment: None,
            mode: None,
            website_url: None,
        }
    }

    pub fn from_image_bytes(bytes: &[u8]) -> Self {
        Self::new(general_purpose::STANDARD.encode(bytes))
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_mode(mut self, mode: CoordinatesMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_website_url(mut self, url: impl Into<String>) -> Self {
        self.website_url = Some(url.into());
        self
    }
}

impl CaptchaRequest for ImageToCoordinatesRequest {
    type Solution = ImageToCoordinatesSolution;

    fn kind(&self) -> TaskKind {
        TaskKind::ImageToCoordinates
    }
}
