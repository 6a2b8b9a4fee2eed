//! Resolution of the base URL the locator code points at.
//!
//! The deployment context is probed through an injected lookup so the
//! precedence order can be tested without touching the process environment.

/// The fixed origin used whenever the production flag is set
pub const PRODUCTION_ORIGIN: &str = "https://lightning-road-transport.replit.app";

/// Port the development server listens on, mirrored in the local fallback
const LOCAL_ORIGIN: &str = "http://localhost:5000";

/// Where the base URL came from. The closed set of outcomes, in the order
/// they are tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrl {
    /// `REPLIT_DEPLOYMENT` was set: the fixed production origin
    Production,
    /// `REPLIT_DOMAINS` was set: the first listed platform domain
    PlatformDomain(String),
    /// `REPL_SLUG` + `REPL_ID` were both set: a hosted-domain URL
    HostedSlug { slug: String, id: String },
    /// Nothing recognised: the local development fallback
    Local,
}

impl BaseUrl {
    /// The origin string, without a trailing slash
    pub fn origin(&self) -> String {
        match self {
            BaseUrl::Production => PRODUCTION_ORIGIN.to_string(),
            BaseUrl::PlatformDomain(domain) => format!("https://{domain}"),
            BaseUrl::HostedSlug { slug, id } => format!("https://{slug}-{id}.repl.co"),
            BaseUrl::Local => LOCAL_ORIGIN.to_string(),
        }
    }
}

/// Resolve the base URL from an environment lookup, first match wins
pub fn resolve_base_url<F>(env: F) -> BaseUrl
where
    F: Fn(&str) -> Option<String>,
{
    if env("REPLIT_DEPLOYMENT")
        .map(|v| !v.trim().is_empty() && v.trim() != "0")
        .unwrap_or(false)
    {
        return BaseUrl::Production;
    }

    if let Some(domains) = env("REPLIT_DOMAINS") {
        if let Some(first) = domains.split(',').map(str::trim).find(|d| !d.is_empty()) {
            return BaseUrl::PlatformDomain(first.to_string());
        }
    }

    if let (Some(slug), Some(id)) = (env("REPL_SLUG"), env("REPL_ID")) {
        let (slug, id) = (slug.trim().to_string(), id.trim().to_string());
        if !slug.is_empty() && !id.is_empty() {
            return BaseUrl::HostedSlug { slug, id };
        }
    }

    BaseUrl::Local
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn production_flag_wins_over_everything() {
        let env = lookup(&[
            ("REPLIT_DEPLOYMENT", "1"),
            ("REPLIT_DOMAINS", "example.replit.dev"),
            ("REPL_SLUG", "contracts"),
            ("REPL_ID", "abc123"),
        ]);
        let resolved = resolve_base_url(env);
        assert_eq!(resolved, BaseUrl::Production);
        assert_eq!(resolved.origin(), PRODUCTION_ORIGIN);
    }

    #[test]
    fn zero_valued_flag_does_not_count() {
        let env = lookup(&[("REPLIT_DEPLOYMENT", "0"), ("REPLIT_DOMAINS", "a.dev,b.dev")]);
        assert_eq!(
            resolve_base_url(env),
            BaseUrl::PlatformDomain("a.dev".into())
        );
    }

    #[test]
    fn platform_domain_takes_first_entry() {
        let env = lookup(&[("REPLIT_DOMAINS", " first.dev , second.dev ")]);
        let resolved = resolve_base_url(env);
        assert_eq!(resolved.origin(), "https://first.dev");
    }

    #[test]
    fn slug_and_id_combine_into_hosted_domain() {
        let env = lookup(&[("REPL_SLUG", "contracts"), ("REPL_ID", "abc123")]);
        assert_eq!(
            resolve_base_url(env).origin(),
            "https://contracts-abc123.repl.co"
        );
    }

    #[test]
    fn slug_without_id_falls_through() {
        let env = lookup(&[("REPL_SLUG", "contracts")]);
        assert_eq!(resolve_base_url(env), BaseUrl::Local);
    }

    #[test]
    fn bare_environment_falls_back_to_localhost() {
        let resolved = resolve_base_url(|_| None);
        assert_eq!(resolved, BaseUrl::Local);
        assert_eq!(resolved.origin(), "http://localhost:5000");
    }
}
