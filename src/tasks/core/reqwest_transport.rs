//! Reqwest-based implementation of the `TaskTransport` trait.
//!
//! A thin adapter around `reqwest::Client` that posts JSON and hands the raw
//! body back to the classifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{TaskTransport, TransportError};

/// Reqwest-backed transport used by default.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a client whose per-request timeout matches `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| TransportError::Http(err.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskTransport for ReqwestTransport {
    async fn post(&self, url: &Url, body: &Value) -> Result<String, TransportError> {
        let response = self
            .client
            .post(url.as_str())
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response.text().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Http(err.to_string())
    }
}

type _AssertSync = Arc<ReqwestTransport>;
