use serde::Serialize;
use serde_json::{Map, Value};

use super::{CaptchaRequest, ProxyExtension, select_kind};
use crate::tasks::catalog::TaskKind;
use crate::tasks::solutions::{GeeTestV3Solution, GeeTestV4Solution};

/// GeeTest v3. The `challenge` value is single-use and must be fresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeeTestV3Request {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub gt: String,
    pub challenge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geetest_api_server_subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geetest_get_lib: Option<String>,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl GeeTestV3Request {
    pub fn new(website_url: impl Into<String>, gt: impl Into<String>, challenge: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            gt: gt.into(),
            challenge: challenge.into(),
            geetest_api_server_subdomain: None,
            geetest_get_lib: None,
            proxy: None,
        }
    }

    pub fn with_api_server_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.geetest_api_server_subdomain = Some(subdomain.into());
        self
    }

    pub fn with_get_lib(mut self, get_lib: impl Into<String>) -> Self {
        self.geetest_get_lib = Some(get_lib.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for GeeTestV3Request {
    type Solution = GeeTestV3Solution;

    fn kind(&self) -> TaskKind {
        select_kind(&self.proxy, TaskKind::GeeTestV3, TaskKind::GeeTestV3Proxyless)
    }
}

/// GeeTest v4, identified by `captcha_id` (sent as `gt`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeeTestV4Request {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub gt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geetest_api_server_subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_parameters: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl GeeTestV4Request {
    pub fn new(website_url: impl Into<String>, captcha_id: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            gt: captcha_id.into(),
            geetest_api_server_subdomain: None,
            init_parameters: None,
            proxy: None,
        }
    }

    pub fn with_api_server_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.geetest_api_server_subdomain = Some(subdomain.into());
        self
    }

    pub fn with_init_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.init_parameters = Some(parameters);
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for GeeTestV4Request {
    type Solution = GeeTestV4Solution;

    fn kind(&self) -> TaskKind {
        select_kind(&self.proxy, TaskKind::GeeTestV4, TaskKind::GeeTestV4Proxyless)
    }
}
