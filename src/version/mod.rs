//! Asset version guessing
//!
//! Two-stage heuristic: a static pattern match against the raw link (cheap,
//! no I/O), then a bounded probe of the asset's content when the link itself
//! carries no version. The probe bounds are part of the contract, not an
//! implementation detail: at most [`PROBE_LINE_LIMIT`] lines are scanned and
//! the scan aborts outright at the first line longer than
//! [`PROBE_LINE_MAX_LEN`] bytes, on the theory that minified bundles put
//! everything on one long line and scanning further is wasted work. The
//! guesser never fails; it answers [`UNKNOWN_VERSION`] when it gives up.

use crate::fetch::{fetch, FetchOptions};
use crate::link::resolve;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use url::Url;

/// Returned when no version could be determined
pub const UNKNOWN_VERSION: &str = "unknown";

/// Maximum number of body lines the content probe inspects (indices 0-20)
pub const PROBE_LINE_LIMIT: usize = 21;

/// Line length beyond which the probe assumes minified content and stops
pub const PROBE_LINE_MAX_LEN: usize = 200;

/// Version-shaped substrings: `major.minor[.patch]` with numeric parts, or
/// an 8-digit `YYYYMMDD` date. Date candidates still need range validation.
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\d+\.)?\d+\.\d+|[12]\d{3}[01]\d[0-3]\d")
        .expect("hardcoded regex pattern is valid")
});

/// Searches text for the first version-like substring
///
/// Matches either a semantic-version shape (`1.2`, `1.2.3`) or an 8-digit
/// date with year in [1900, 2999], month in [01, 12], and day in [01, 31].
/// A date candidate that fails range validation does not stop the search;
/// later candidates are still considered.
///
/// # Examples
///
/// ```
/// use pagescope::version::find_version;
///
/// assert_eq!(find_version("styles-1.2.3.css"), Some("1.2.3"));
/// assert_eq!(find_version("build-20230615.js"), Some("20230615"));
/// assert_eq!(find_version("app.js"), None);
/// ```
pub fn find_version(text: &str) -> Option<&str> {
    for candidate in VERSION_RE.find_iter(text) {
        let matched = candidate.as_str();
        if matched.contains('.') || is_plausible_date(matched) {
            return Some(matched);
        }
    }
    None
}

/// Validates the range of an 8-digit date candidate
fn is_plausible_date(s: &str) -> bool {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let year: u32 = s[0..4].parse().unwrap_or(0);
    let month: u32 = s[4..6].parse().unwrap_or(0);
    let day: u32 = s[6..8].parse().unwrap_or(0);

    (1900..=2999).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day)
}

/// Guesses the version of a linked asset
///
/// First tries [`find_version`] against the raw link; only on a miss does it
/// resolve the link against the page URL and fetch the asset (with the same
/// options as the page fetch) to scan a bounded prefix of its body. Always
/// returns a string; any probe failure degrades to [`UNKNOWN_VERSION`] and
/// is never surfaced as an error.
pub async fn guess_version(
    link: &str,
    page_url: &Url,
    client: &Client,
    opts: &FetchOptions,
) -> String {
    if let Some(version) = find_version(link) {
        return version.to_string();
    }

    let resolved = resolve(link, page_url);
    let Some(url) = resolved.url else {
        return UNKNOWN_VERSION.to_string();
    };

    match fetch(&url, client, opts).await {
        Ok(result) => {
            let text = String::from_utf8_lossy(&result.body);
            for (index, line) in text.lines().enumerate() {
                if index >= PROBE_LINE_LIMIT {
                    break;
                }
                if line.len() > PROBE_LINE_MAX_LEN {
                    // Minified content; later lines are not worth scanning.
                    break;
                }
                if let Some(version) = find_version(line) {
                    return version.to_string();
                }
            }
            UNKNOWN_VERSION.to_string()
        }
        Err(e) => {
            tracing::debug!(link, error = %e, "version probe failed");
            UNKNOWN_VERSION.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_part_version() {
        assert_eq!(find_version("jquery-1.11.min.js"), Some("1.11"));
    }

    #[test]
    fn test_three_part_version() {
        assert_eq!(find_version("styles-1.2.3.css"), Some("1.2.3"));
    }

    #[test]
    fn test_version_in_query_string() {
        assert_eq!(find_version("/js/app.js?v=4.7.0"), Some("4.7.0"));
    }

    #[test]
    fn test_valid_date() {
        assert_eq!(find_version("bundle-20230615.js"), Some("20230615"));
    }

    #[test]
    fn test_month_thirteen_does_not_match() {
        assert_eq!(find_version("20231315"), None);
    }

    #[test]
    fn test_month_zero_does_not_match() {
        assert_eq!(find_version("20230015"), None);
    }

    #[test]
    fn test_day_zero_does_not_match() {
        assert_eq!(find_version("20230600"), None);
    }

    #[test]
    fn test_year_before_1900_does_not_match() {
        assert_eq!(find_version("18991231"), None);
    }

    #[test]
    fn test_rejected_date_does_not_stop_search() {
        assert_eq!(find_version("build-20230600-then-1.2.3"), Some("1.2.3"));
    }

    #[test]
    fn test_no_version() {
        assert_eq!(find_version("app.js"), None);
    }

    #[test]
    fn test_plain_text_line() {
        assert_eq!(find_version("// jQuery JavaScript Library v1.11.1"), Some("1.11.1"));
    }

    #[test]
    fn test_date_range_validation() {
        assert!(is_plausible_date("19000101"));
        assert!(is_plausible_date("29991231"));
        assert!(!is_plausible_date("20231232"));
        assert!(!is_plausible_date("2023061"));
    }

    #[tokio::test]
    async fn test_static_match_needs_no_network() {
        // Client points nowhere; a static hit must never touch it.
        let opts = FetchOptions::default();
        let client = crate::fetch::build_http_client(&opts).unwrap();
        let page = Url::parse("https://site.invalid/p").unwrap();

        let version = guess_version("styles-1.2.3.css", &page, &client, &opts).await;
        assert_eq!(version, "1.2.3");
    }
}
