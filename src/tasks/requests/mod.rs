//! Typed task requests.
//!
//! Every family is a plain struct composed from shared pieces
//! ([`WebsiteTarget`], [`ProxyExtension`]) rather than a hierarchy. Attaching
//! a proxy extension switches the request to the proxied task kind; leaving it
//! off selects the proxyless one.

mod amazon_waf;
mod funcaptcha;
mod geetest;
mod image;
mod recaptcha;
mod token;
mod turnstile;

use serde::Serialize;

use super::catalog::TaskKind;
use super::core::types::ProxyConfig;
use super::solutions::Solution;

pub use amazon_waf::AmazonWafRequest;
pub use funcaptcha::FunCaptchaRequest;
pub use geetest::{GeeTestV3Request, GeeTestV4Request};
pub use image::{CoordinatesMode, ImageToCoordinatesRequest, ImageToTextRequest, NumericOption};
pub use recaptcha::{RecaptchaV2EnterpriseRequest, RecaptchaV2Request, RecaptchaV3Request};
pub use token::{FriendlyCaptchaRequest, ProsopoRequest};
pub use turnstile::TurnstileRequest;

/// A request the client can submit as a task.
pub trait CaptchaRequest: Serialize + Send + Sync {
    /// Solution shape returned once the task is ready.
    type Solution: Solution;

    /// Kind tag used to look up the catalog entry.
    fn kind(&self) -> TaskKind;
}

/// Page a token-style challenge lives on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteTarget {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    #[serde(rename = "websiteKey")]
    pub website_key: String,
}

impl WebsiteTarget {
    pub fn new(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            website_key: website_key.into(),
        }
    }
}

/// Proxy and browser identity the remote worker should use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyExtension {
    #[serde(rename = "proxyConfig")]
    pub proxy: ProxyConfig,
    #[serde(rename = "userAgent", skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ProxyExtension {
    pub fn new(proxy: ProxyConfig) -> Self {
        Self {
            proxy,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

pub(crate) fn select_kind(
    proxy: &Option<ProxyExtension>,
    proxied: TaskKind,
    proxyless: TaskKind,
) -> TaskKind {
    if proxy.is_some() { proxied } else { proxyless }
}
