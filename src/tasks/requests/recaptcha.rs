use serde::Serialize;
use serde_json::{Map, Value};

use super::{CaptchaRequest, ProxyExtension, WebsiteTarget, select_kind};
use crate::tasks::catalog::TaskKind;
use crate::tasks::solutions::RecaptchaSolution;

/// reCAPTCHA v2, checkbox or invisible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV2Request {
    #[serde(flatten)]
    pub target: WebsiteTarget,
    #[serde(rename = "recaptchaDataSValue", skip_serializing_if = "Option::is_none")]
    pub data_s_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_invisible: Option<bool>,
    /// `name=value; name2=value2` cookies for the worker's browser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl RecaptchaV2Request {
    pub fn new(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            target: WebsiteTarget::new(website_url, website_key),
            data_s_value: None,
            is_invisible: None,
            cookies: None,
            proxy: None,
        }
    }

    pub fn with_data_s_value(mut self, value: impl Into<String>) -> Self {
        self.data_s_value = Some(value.into());
        self
    }

    pub fn invisible(mut self) -> Self {
        self.is_invisible = Some(true);
        self
    }

    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = Some(cookies.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for RecaptchaV2Request {
    type Solution = RecaptchaSolution;

    fn kind(&self) -> TaskKind {
        select_kind(&self.proxy, TaskKind::RecaptchaV2, TaskKind::RecaptchaV2Proxyless)
    }
}

/// reCAPTCHA v2 Enterprise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV2EnterpriseRequest {
    #[serde(flatten)]
    pub target: WebsiteTarget,
    /// Extra `grecaptcha.enterprise.render` parameters, such as `s`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_payload: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_domain: Option<String>,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl RecaptchaV2EnterpriseRequest {
    pub fn new(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            target: WebsiteTarget::new(website_url, website_key),
            enterprise_payload: None,
            api_domain: None,
            proxy: None,
        }
    }

    pub fn with_enterprise_payload(mut self, payload: Map<String, Value>) -> Self {
        self.enterprise_payload = Some(payload);
        self
    }

    pub fn with_api_domain(mut self, domain: impl Into<String>) -> Self {
        self.api_domain = Some(domain.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for RecaptchaV2EnterpriseRequest {
    type Solution = RecaptchaSolution;

    fn kind(&self) -> TaskKind {
        select_kind(
            &self.proxy,
            TaskKind::RecaptchaV2Enterprise,
            TaskKind::RecaptchaV2EnterpriseProxyless,
        )
    }
}

/// reCAPTCHA v3, always solved without a proxy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV3Request {
    #[serde(flatten)]
    pub target: WebsiteTarget,
    /// One of `0.3`, `0.7` or `0.9`.
    pub min_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_domain: Option<String>,
    #[serde(skip)]
    pub is_enterprise: bool,
}

impl RecaptchaV3Request {
    pub fn new(website_url: impl Into<String>, website_key: impl Into<String>, min_score: f64) -> Self {
        Self {
            target: WebsiteTarget::new(website_url, website_key),
            min_score,
            page_action: None,
            api_domain: None,
            is_enterprise: false,
        }
    }

    pub fn with_page_action(mut self, action: impl Into<String>) -> Self {
        self.page_action = Some(action.into());
        self
    }

    pub fn with_api_domain(mut self, domain: impl Into<String>) -> Self {
        self.api_domain = Some(domain.into());
        self
    }

    /// Targets the Enterprise flavour of v3.
    pub fn enterprise(mut self) -> Self {
        self.is_enterprise = true;
        self
    }
}

impl CaptchaRequest for RecaptchaV3Request {
    type Solution = RecaptchaSolution;

    fn kind(&self) -> TaskKind {
        if self.is_enterprise {
            TaskKind::RecaptchaV3Enterprise
        } else {
            TaskKind::RecaptchaV3
        }
    }
}
