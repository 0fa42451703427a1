//! Report assembly
//!
//! Orchestrates the whole inspection pipeline for one page: fetch the page,
//! analyze the document, then resolve and version-guess each referenced
//! asset in document order. Everything runs sequentially; the only repeat
//! visitor of the network is the version guesser's bounded content probe.

mod render;

pub use render::render_report;

use crate::analyze::{analyze, AssetKind, DocumentMetadata};
use crate::fetch::{fetch, FetchOptions, FetchResult};
use crate::link::resolve;
use crate::version::guess_version;
use reqwest::Client;
use url::Url;

/// One referenced stylesheet or script, ready for rendering
#[derive(Debug, Clone)]
pub struct AssetReference {
    pub kind: AssetKind,

    /// Link exactly as it appeared in markup
    pub raw_link: String,

    /// Resolved absolute URL
    pub absolute_url: String,

    /// Display name from the link resolver
    pub display_name: String,

    /// Matched version pattern or the literal `unknown`, never empty
    pub version: String,

    /// Redacted markup snippet, captured only in verbose mode
    pub markup: Option<String>,
}

/// HTTP header highlights shown at the top of the report
#[derive(Debug, Clone)]
pub struct HeaderHighlights {
    pub server: Option<String>,
    pub x_powered_by: Option<String>,
    pub content_type: Option<String>,

    /// Parsed `max-age` seconds from Strict-Transport-Security
    pub hsts_max_age: Option<u64>,
}

/// The assembled diagnostic report for one page
#[derive(Debug, Clone)]
pub struct InspectionReport {
    pub final_url: String,
    pub headers: HeaderHighlights,
    pub metadata: DocumentMetadata,
    pub cookies: Vec<(String, String)>,
    pub stylesheets: Vec<AssetReference>,
    pub scripts: Vec<AssetReference>,
}

/// Builds the inspection report for one page
///
/// Returns `None` when the page fetch itself failed; the fetcher has already
/// printed its diagnostics in that case and there is nothing to report.
/// Asset-level failures never abort the report, they degrade to an
/// `unknown` version.
pub async fn build_report(
    url: &Url,
    client: &Client,
    opts: &FetchOptions,
    verbose: bool,
) -> Option<InspectionReport> {
    let result = match fetch(url, client, opts).await {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "page fetch failed, no report");
            return None;
        }
    };

    let analysis = analyze(&result);
    let page_url = result.final_url.clone();

    let mut stylesheets = Vec::new();
    let mut scripts = Vec::new();

    for asset in &analysis.assets {
        let resolved = resolve(&asset.link, &page_url);
        let version = guess_version(&asset.link, &page_url, client, opts).await;

        let reference = AssetReference {
            kind: asset.kind,
            raw_link: asset.link.clone(),
            absolute_url: resolved.absolute_url,
            display_name: resolved.display_name,
            version,
            markup: if verbose {
                Some(asset.snippet.clone())
            } else {
                None
            },
        };

        match asset.kind {
            AssetKind::Stylesheet => stylesheets.push(reference),
            AssetKind::Script => scripts.push(reference),
        }
    }

    Some(InspectionReport {
        final_url: result.final_url.to_string(),
        headers: header_highlights(&result),
        metadata: analysis.metadata,
        cookies: result.cookies,
        stylesheets,
        scripts,
    })
}

/// Pulls the highlighted headers out of a fetch result
fn header_highlights(result: &FetchResult) -> HeaderHighlights {
    HeaderHighlights {
        server: result.header("server").map(str::to_string),
        x_powered_by: result.header("x-powered-by").map(str::to_string),
        content_type: result.header("content-type").map(str::to_string),
        hsts_max_age: result
            .header("strict-transport-security")
            .and_then(parse_hsts_max_age),
    }
}

/// Parses the `max-age=<digits>` directive of an HSTS header value
fn parse_hsts_max_age(value: &str) -> Option<u64> {
    let lower = value.to_ascii_lowercase();
    let index = lower.find("max-age=")?;

    let digits: String = lower[index + "max-age=".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}
