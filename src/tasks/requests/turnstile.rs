use serde::Serialize;

use super::{CaptchaRequest, ProxyExtension, WebsiteTarget, select_kind};
use crate::tasks::catalog::TaskKind;
use crate::tasks::solutions::TurnstileSolution;

/// Cloudflare Turnstile widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnstileRequest {
    #[serde(flatten)]
    pub target: WebsiteTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(rename = "turnstileCData", skip_serializing_if = "Option::is_none")]
    pub c_data: Option<String>,
    #[serde(flatten)]
    pub proxy: Option<ProxyExtension>,
}

impl TurnstileRequest {
    pub fn new(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            target: WebsiteTarget::new(website_url, website_key),
            action: None,
            c_data: None,
            proxy: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_c_data(mut self, c_data: impl Into<String>) -> Self {
        self.c_data = Some(c_data.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyExtension) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl CaptchaRequest for TurnstileRequest {
    type Solution = TurnstileSolution;

    fn kind(&self) -> TaskKind {
        select_kind(&self.proxy, TaskKind::Turnstile, TaskKind::TurnstileProxyless)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::payload;

    #[test]
    fn optional_fields_use_wire_names() {
        let request = TurnstileRequest::new("https://a.test", "0x4AAA").with_action("login").with_c_data("cd");
        let task = payload::build(&request).unwrap();
        assert_eq!(task["action"], "login");
        assert_eq!(task["turnstileCData"], "cd");
        assert!(!task.contains_key("userAgent"));
    }
}
