//! Per-run fetch options
//!
//! Everything the operator can vary about outgoing requests lives here:
//! credentials, cookies, proxy, timeout, and the User-Agent string. The
//! alias table maps short browser names to full User-Agent values and is
//! process-wide immutable configuration, not mutable state.

use std::time::Duration;

/// Default request timeout when the operator does not supply one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Known short names for common User-Agent strings
///
/// An unrecognized name is passed through verbatim as the literal header
/// value, so arbitrary custom strings still work.
pub const USER_AGENT_ALIASES: &[(&str, &str)] = &[
    (
        "desktop",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ),
    (
        "firefox",
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    ),
    (
        "mobile",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 \
         (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1",
    ),
    (
        "googlebot",
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
    ),
];

/// Resolves a User-Agent alias to its full string
///
/// Returns the mapped value for a known alias, or the input verbatim.
pub fn resolve_user_agent(name: &str) -> String {
    USER_AGENT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, ua)| (*ua).to_string())
        .unwrap_or_else(|| name.to_string())
}

/// HTTP authentication credentials (username:password pair)
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Options applied to every request of a run
///
/// The page fetch and any version-probe fetches use the same options, so an
/// authenticated page's assets are probed with the same credentials.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Resolved User-Agent string; `None` uses the pagescope default
    pub user_agent: Option<String>,

    /// Optional credentials for basic or digest authentication
    pub auth: Option<Credentials>,

    /// Use HTTP Digest authentication instead of Basic
    pub digest: bool,

    /// Cookies sent with every request, in the order given
    pub cookies: Vec<(String, String)>,

    /// Optional proxy URL (`http://[user[:pass]@]host[:port]`)
    pub proxy: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            auth: None,
            digest: false,
            cookies: Vec::new(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FetchOptions {
    /// Renders the configured cookies as a `Cookie` header value
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_alias_resolves() {
        let ua = resolve_user_agent("desktop");
        assert!(ua.contains("Chrome"));
        assert_ne!(ua, "desktop");
    }

    #[test]
    fn test_mobile_alias_resolves() {
        let ua = resolve_user_agent("mobile");
        assert!(ua.contains("iPhone"));
    }

    #[test]
    fn test_unknown_alias_passes_through() {
        assert_eq!(resolve_user_agent("MyScanner/2.0"), "MyScanner/2.0");
    }

    #[test]
    fn test_cookie_header_single() {
        let opts = FetchOptions {
            cookies: vec![("session".to_string(), "abc123".to_string())],
            ..Default::default()
        };
        assert_eq!(opts.cookie_header(), "session=abc123");
    }

    #[test]
    fn test_cookie_header_multiple_preserves_order() {
        let opts = FetchOptions {
            cookies: vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ],
            ..Default::default()
        };
        assert_eq!(opts.cookie_header(), "a=1; b=2");
    }

    #[test]
    fn test_default_timeout() {
        let opts = FetchOptions::default();
        assert_eq!(opts.timeout, DEFAULT_TIMEOUT);
    }
}
