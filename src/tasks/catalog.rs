//! Static registry of every task kind.
//!
//! Each [`TaskKind`] maps to its wire task-type name, its validator and the
//! post-processing rule the payload builder applies. The table is built once
//! from [`TaskKind::ALL`] through an exhaustive `match`. A new kind must be
//! described there and listed in `ALL`. The order of `ALL` is checked at
//! compile time; a kind missing from it would panic on lookup.

use once_cell::sync::Lazy;

use super::validation::{Validator, rules};

/// Every request variant the client can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    ImageToText,
    ImageToCoordinates,
    RecaptchaV2,
    RecaptchaV2Proxyless,
    RecaptchaV2Enterprise,
    RecaptchaV2EnterpriseProxyless,
    RecaptchaV3,
    RecaptchaV3Enterprise,
    FunCaptcha,
    FunCaptchaProxyless,
    GeeTestV3,
    GeeTestV3Proxyless,
    GeeTestV4,
    GeeTestV4Proxyless,
    Turnstile,
    TurnstileProxyless,
    Prosopo,
    ProsopoProxyless,
    FriendlyCaptcha,
    FriendlyCaptchaProxyless,
    AmazonWaf,
    AmazonWafProxyless,
}

impl TaskKind {
    /// All kinds, in declaration order.
    pub const ALL: [TaskKind; 22] = [
        TaskKind::ImageToText,
        TaskKind::ImageToCoordinates,
        TaskKind::RecaptchaV2,
        TaskKind::RecaptchaV2Proxyless,
        TaskKind::RecaptchaV2Enterprise,
        TaskKind::RecaptchaV2EnterpriseProxyless,
        TaskKind::RecaptchaV3,
        TaskKind::RecaptchaV3Enterprise,
        TaskKind::FunCaptcha,
        TaskKind::FunCaptchaProxyless,
        TaskKind::GeeTestV3,
        TaskKind::GeeTestV3Proxyless,
        TaskKind::GeeTestV4,
        TaskKind::GeeTestV4Proxyless,
        TaskKind::Turnstile,
        TaskKind::TurnstileProxyless,
        TaskKind::Prosopo,
        TaskKind::ProsopoProxyless,
        TaskKind::FriendlyCaptcha,
        TaskKind::FriendlyCaptchaProxyless,
        TaskKind::AmazonWaf,
        TaskKind::AmazonWafProxyless,
    ];

    /// Wire task-type name.
    pub fn task_type(self) -> &'static str {
        resolve(self).task_type
    }
}

const _: () = {
    let mut index = 0;
    while index < TaskKind::ALL.len() {
        assert!(TaskKind::ALL[index] as usize == index, "TaskKind::ALL is out of declaration order");
        index += 1;
    }
};

/// Post-processing applied to the projected payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRule {
    None,
    /// Inject `version: n`.
    Version(u8),
    /// Inject `isEnterprise: true`.
    Enterprise,
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub kind: TaskKind,
    pub task_type: &'static str,
    pub validator: Validator,
    pub payload_rule: PayloadRule,
}

static CATALOG: Lazy<Vec<CatalogEntry>> =
    Lazy::new(|| TaskKind::ALL.iter().copied().map(describe).collect());

/// Looks up the catalog entry for `kind`.
pub fn resolve(kind: TaskKind) -> &'static CatalogEntry {
    &CATALOG[kind as usize]
}

/// Every registered entry, in declaration order.
pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

fn describe(kind: TaskKind) -> CatalogEntry {
    use PayloadRule as P;
    use TaskKind as K;

    let (task_type, validator, payload_rule) = match kind {
        K::ImageToText => ("ImageToTextTask", Validator::new(&[rules::IMAGE_TO_TEXT]), P::None),
        K::ImageToCoordinates => (
            "ImageToCoordinatesTask",
            Validator::new(&[rules::IMAGE_TO_COORDINATES]),
            P::None,
        ),
        K::RecaptchaV2 => (
            "RecaptchaV2Task",
            Validator::new(&[rules::SITE, rules::PROXIED]),
            P::None,
        ),
        K::RecaptchaV2Proxyless => (
            "RecaptchaV2TaskProxyless",
            Validator::new(&[rules::SITE]),
            P::None,
        ),
        K::RecaptchaV2Enterprise => (
            "RecaptchaV2EnterpriseTask",
            Validator::new(&[rules::SITE, rules::PROXIED]),
            P::None,
        ),
        K::RecaptchaV2EnterpriseProxyless => (
            "RecaptchaV2EnterpriseTaskProxyless",
            Validator::new(&[rules::SITE]),
            P::None,
        ),
        K::RecaptchaV3 => (
            "RecaptchaV3TaskProxyless",
            Validator::new(&[rules::SITE, rules::RECAPTCHA_V3]),
            P::None,
        ),
        K::RecaptchaV3Enterprise => (
            "RecaptchaV3TaskProxyless",
            Validator::new(&[rules::SITE, rules::RECAPTCHA_V3]),
            P::Enterprise,
        ),
        K::FunCaptcha => (
            "FunCaptchaTask",
            Validator::new(&[rules::FUNCAPTCHA, rules::PROXIED]),
            P::None,
        ),
        K::FunCaptchaProxyless => (
            "FunCaptchaTaskProxyless",
            Validator::new(&[rules::FUNCAPTCHA]),
            P::None,
        ),
        K::GeeTestV3 => (
            "GeeTestTask",
            Validator::new(&[rules::GEETEST_V3, rules::PROXIED]),
            P::Version(3),
        ),
        K::GeeTestV3Proxyless => (
            "GeeTestTaskProxyless",
            Validator::new(&[rules::GEETEST_V3]),
            P::Version(3),
        ),
        K::GeeTestV4 => (
            "GeeTestTask",
            Validator::new(&[rules::GEETEST_V4, rules::PROXIED]),
            P::Version(4),
        ),
        K::GeeTestV4Proxyless => (
            "GeeTestTaskProxyless",
            Validator::new(&[rules::GEETEST_V4]),
            P::Version(4),
        ),
        K::Turnstile => (
            "TurnstileTask",
            Validator::new(&[rules::SITE, rules::PROXIED]),
            P::None,
        ),
        K::TurnstileProxyless => (
            "TurnstileTaskProxyless",
            Validator::new(&[rules::SITE]),
            P::None,
        ),
        K::Prosopo => (
            "ProsopoTask",
            Validator::new(&[rules::SITE, rules::PROXIED]),
            P::None,
        ),
        K::ProsopoProxyless => (
            "ProsopoTaskProxyless",
            Validator::new(&[rules::SITE]),
            P::None,
        ),
        K::FriendlyCaptcha => (
            "FriendlyCaptchaTask",
            Validator::new(&[rules::SITE, rules::PROXIED]),
            P::None,
        ),
        K::FriendlyCaptchaProxyless => (
            "FriendlyCaptchaTaskProxyless",
            Validator::new(&[rules::SITE]),
            P::None,
        ),
        K::AmazonWaf => (
            "AmazonTask",
            Validator::new(&[rules::SITE, rules::AMAZON_WAF, rules::OPTIONAL_PROXY]),
            P::None,
        ),
        K::AmazonWafProxyless => (
            "AmazonTaskProxyless",
            Validator::new(&[rules::SITE, rules::AMAZON_WAF]),
            P::None,
        ),
    };

    CatalogEntry {
        kind,
        task_type,
        validator,
        payload_rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::validation::Rule;

    #[test]
    fn entries_are_indexed_by_kind() {
        for kind in TaskKind::ALL {
            assert_eq!(resolve(kind).kind, kind);
        }
        assert_eq!(entries().len(), TaskKind::ALL.len());
    }

    #[test]
    fn geetest_versions_share_a_task_type() {
        assert_eq!(resolve(TaskKind::GeeTestV3).task_type, "GeeTestTask");
        assert_eq!(resolve(TaskKind::GeeTestV4).task_type, "GeeTestTask");
        assert_eq!(resolve(TaskKind::GeeTestV3).payload_rule, PayloadRule::Version(3));
        assert_eq!(resolve(TaskKind::GeeTestV4Proxyless).payload_rule, PayloadRule::Version(4));
    }

    #[test]
    fn enterprise_v3_reuses_proxyless_type_with_flag() {
        let entry = resolve(TaskKind::RecaptchaV3Enterprise);
        assert_eq!(entry.task_type, "RecaptchaV3TaskProxyless");
        assert_eq!(entry.payload_rule, PayloadRule::Enterprise);
    }

    #[test]
    fn proxied_kinds_require_a_proxy_and_proxyless_kinds_do_not() {
        for entry in entries() {
            let requires_proxy = entry.validator.rules().any(|rule| *rule == Rule::ProxyRequired);
            let proxyless = entry.task_type.ends_with("Proxyless");
            if proxyless || matches!(entry.kind, TaskKind::ImageToText | TaskKind::ImageToCoordinates | TaskKind::AmazonWaf) {
                assert!(!requires_proxy, "{:?} should not require a proxy", entry.kind);
            } else {
                assert!(requires_proxy, "{:?} should require a proxy", entry.kind);
            }
        }
    }
}
