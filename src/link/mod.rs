//! Asset link resolution
//!
//! Classifies a stylesheet/script link relative to the page it appeared on:
//! absolute vs relative, same-domain vs cross-domain, and derives the name
//! shown in the report. Pure string/URL computation, no network access, and
//! it never fails: malformed input degrades to best-effort output.

use url::Url;

/// A link resolved against its page URL
#[derive(Debug, Clone)]
pub struct ResolvedLink {
    /// Fully resolved URL, when the link could be parsed at all
    pub url: Option<Url>,

    /// Absolute URL as a string; falls back to the raw link on parse failure
    pub absolute_url: String,

    /// Canonical display name: path for same-domain links, host + path for
    /// cross-domain ones
    pub display_name: String,

    /// True when the link points at a different host[:port] than the page
    pub cross_domain: bool,
}

/// Resolves a raw markup link against the page URL
///
/// # Resolution Rules
///
/// - A link with a network location (`https://...`) is used as-is
/// - A schema-less network location (`//cdn.example.com/a.js`) inherits the
///   page's scheme
/// - Anything else joins against the page URL with standard RFC 3986 rules,
///   including `..` segment normalization
///
/// # Display Name
///
/// Cross-domain links render as `host[:port]/path` with scheme and query
/// stripped; same-domain links render as the resolved path, which always
/// starts with `/` (an empty path becomes `/`).
///
/// # Examples
///
/// ```
/// use pagescope::link::resolve;
/// use url::Url;
///
/// let page = Url::parse("https://site.com/p").unwrap();
/// let resolved = resolve("//cdn.example.com/a.js", &page);
/// assert!(resolved.cross_domain);
/// assert_eq!(resolved.absolute_url, "https://cdn.example.com/a.js");
/// ```
pub fn resolve(link: &str, page_url: &Url) -> ResolvedLink {
    let trimmed = link.trim();

    let candidate = if trimmed.starts_with("//") {
        format!("{}:{}", page_url.scheme(), trimmed)
    } else {
        trimmed.to_string()
    };

    let resolved = match Url::parse(&candidate) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => page_url.join(trimmed).ok(),
        Err(_) => None,
    };

    let Some(url) = resolved else {
        // Unparseable even after joining. Keep the raw link visible rather
        // than dropping the asset from the report.
        return ResolvedLink {
            url: None,
            absolute_url: trimmed.to_string(),
            display_name: trimmed.to_string(),
            cross_domain: false,
        };
    };

    let cross_domain = url.host_str().is_some() && !same_authority(&url, page_url);
    let display_name = if cross_domain {
        format!("{}{}", host_port(&url), display_path(&url))
    } else {
        display_path(&url)
    };

    ResolvedLink {
        absolute_url: url.to_string(),
        display_name,
        cross_domain,
        url: Some(url),
    }
}

/// Compares host and effective port of two URLs
fn same_authority(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Renders `host[:port]`, with the port only when explicitly present
fn host_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Path component for display, guaranteed to start with `/`
fn display_path(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://site.com/p").unwrap()
    }

    #[test]
    fn test_schemaless_inherits_page_scheme() {
        let resolved = resolve("//cdn.example.com/a.js", &page());
        assert!(resolved.cross_domain);
        assert_eq!(resolved.absolute_url, "https://cdn.example.com/a.js");
        assert_eq!(resolved.display_name, "cdn.example.com/a.js");
    }

    #[test]
    fn test_root_relative_same_domain() {
        let resolved = resolve("/css/app.css", &page());
        assert!(!resolved.cross_domain);
        assert_eq!(resolved.display_name, "/css/app.css");
        assert_eq!(resolved.absolute_url, "https://site.com/css/app.css");
    }

    #[test]
    fn test_relative_path_joins_against_page() {
        let page = Url::parse("https://site.com/blog/post").unwrap();
        let resolved = resolve("assets/app.js", &page);
        assert_eq!(resolved.absolute_url, "https://site.com/blog/assets/app.js");
        assert_eq!(resolved.display_name, "/blog/assets/app.js");
    }

    #[test]
    fn test_dot_segments_normalized() {
        let page = Url::parse("https://site.com/a/b/page").unwrap();
        let resolved = resolve("../c/lib.js", &page);
        assert_eq!(resolved.absolute_url, "https://site.com/a/c/lib.js");
    }

    #[test]
    fn test_absolute_same_domain() {
        let resolved = resolve("https://site.com/js/main.js", &page());
        assert!(!resolved.cross_domain);
        assert_eq!(resolved.display_name, "/js/main.js");
    }

    #[test]
    fn test_absolute_cross_domain_strips_scheme_and_query() {
        let resolved = resolve("http://cdn.other.net/lib.js?v=3", &page());
        assert!(resolved.cross_domain);
        assert_eq!(resolved.display_name, "cdn.other.net/lib.js");
    }

    #[test]
    fn test_cross_domain_keeps_explicit_port() {
        let resolved = resolve("https://cdn.other.net:8443/lib.js", &page());
        assert!(resolved.cross_domain);
        assert_eq!(resolved.display_name, "cdn.other.net:8443/lib.js");
    }

    #[test]
    fn test_same_host_different_port_is_cross_domain() {
        let page = Url::parse("http://127.0.0.1:8080/").unwrap();
        let resolved = resolve("http://127.0.0.1:9090/a.js", &page);
        assert!(resolved.cross_domain);
    }

    #[test]
    fn test_default_port_matches_implicit() {
        let resolved = resolve("https://site.com:443/a.js", &page());
        assert!(!resolved.cross_domain);
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let resolved = resolve("https://cdn.other.net", &page());
        assert_eq!(resolved.display_name, "cdn.other.net/");
    }

    #[test]
    fn test_malformed_link_degrades_to_raw() {
        let resolved = resolve("http://[not-a-host/a.js", &page());
        assert!(!resolved.cross_domain);
        assert_eq!(resolved.display_name, "http://[not-a-host/a.js");
        assert!(resolved.url.is_none());
    }
}
