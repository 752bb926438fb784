use serde::Serialize;

use super::{CaptchaRequest, ProxyExtension, select_kind};
use crate::tasks::catalog::TaskKind;
use crate::tasks::solutions::FunCaptchaSolution;

/// Arkose Labs FunCaptcha.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunCaptchaRequest {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub website_public_key: String,
    #[serde(rename = "funcaptchaApiJSSubdomain", skip_serializing_if = "Option::is_none")]
    pub api_js_subdomain: Option<String>,
    /// Extra `data[blob]` JSON string some sites require.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl FunCaptchaRequest {
    pub fn new(website_url: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            website_public_key: public_key.into(),
            api_js_subdomain: None,
            data: None,
            proxy: None,
        }
    }

    pub fn with_api_js_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.api_js_subdomain = Some(subdomain.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for FunCaptchaRequest {
    type Solution = FunCaptchaSolution;

    fn kind(&self) -> TaskKind {
        select_kind(&self.proxy, TaskKind::FunCaptcha, TaskKind::FunCaptchaProxyless)
    }
}
