use serde::Serialize;

use super::{CaptchaRequest, ProxyExtension, WebsiteTarget, select_kind};
use crate::tasks::catalog::TaskKind;
use crate::tasks::solutions::AmazonWafSolution;

/// AWS WAF captcha. `iv` and `context` come from the challenge page.
///
/// A proxy is optional here; when attached it must still be complete, but a
/// user agent is not required.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmazonWafRequest {
    #[serde(flatten)]
    pub target: WebsiteTarget,
    pub iv: String,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_script: Option<String>,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl AmazonWafRequest {
    pub fn new(
        website_url: impl Into<String>,
        website_key: impl Into<String>,
        iv: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            target: WebsiteTarget::new(website_url, website_key),
            iv: iv.into(),
            context: context.into(),
            captcha_script: None,
            challenge_script: None,
            proxy: None,
        }
    }

    pub fn with_captcha_script(mut self, url: impl Into<String>) -> Self {
        self.captcha_script = Some(url.into());
        self
    }

    pub fn with_challenge_script(mut self, url: impl Into<String>) -> Self {
        self.challenge_script = Some(url.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for AmazonWafRequest {
    type Solution = AmazonWafSolution;

    fn kind(&self) -> TaskKind {
        select_kind(&self.proxy, TaskKind::AmazonWaf, TaskKind::AmazonWafProxyless)
    }
}
