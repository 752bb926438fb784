//! Token challenges that only need the page and its site key.

use serde::Serialize;

use super::{CaptchaRequest, ProxyExtension, WebsiteTarget, select_kind};
use crate::tasks::catalog::TaskKind;
use crate::tasks::solutions::TokenSolution;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProsopoRequest {
    #[serde(flatten)]
    pub target: WebsiteTarget,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl ProsopoRequest {
    pub fn new(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            target: WebsiteTarget::new(website_url, website_key),
            proxy: None,
        }
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for ProsopoRequest {
    type Solution = TokenSolution;

    fn kind(&self) -> TaskKind {
        select_kind(&self.proxy, TaskKind::Prosopo, TaskKind::ProsopoProxyless)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendlyCaptchaRequest {
    #[serde(flatten)]
    pub target: WebsiteTarget,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl FriendlyCaptchaRequest {
    pub fn new(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            target: WebsiteTarget::new(website_url, website_key),
            proxy: None,
        }
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for FriendlyCaptchaRequest {
    type Solution = TokenSolution;

    fn kind(&self) -> TaskKind {
        select_kind(
            &self.proxy,
            TaskKind::FriendlyCaptcha,
            TaskKind::FriendlyCaptchaProxyless,
        )
    }
}
