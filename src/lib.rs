//! Pagescope: a single-page HTTP and HTML diagnostic inspector
//!
//! This crate fetches exactly one web page, records its full redirect chain,
//! and reports server headers, document metadata, cookies, and every
//! referenced stylesheet/script asset together with a best-effort version
//! guess for each one. It inspects one page only: no recursion into linked
//! pages, no security conclusions, no retries.

pub mod analyze;
pub mod fetch;
pub mod link;
pub mod report;
pub mod version;

use thiserror::Error;

/// Setup-level errors for pagescope operations
///
/// These are the only errors that abort the process. Fetch failures are
/// represented by [`FetchError`] and are always recovered by their callers.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("invalid proxy URL '{proxy}': {source}")]
    InvalidProxy {
        proxy: String,
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure kinds for a single fetch attempt
///
/// All variants are recovered at the fetcher boundary: they are reported on
/// the diagnostic stream, produce no result for that fetch, and never
/// terminate the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timeout")]
    Timeout,

    #[error("HTTP error status {0}")]
    HttpStatus(u16),

    #[error("too many redirects (limit {0})")]
    RedirectLimit(usize),
}

/// Result type alias for pagescope operations
pub type Result<T> = std::result::Result<T, InspectError>;

// Re-export commonly used types
pub use analyze::{analyze, AssetKind, DocumentAnalysis, DocumentMetadata, Doctype};
pub use fetch::{build_http_client, fetch, FetchOptions, FetchResult, HopRecord};
pub use link::{resolve, ResolvedLink};
pub use report::{build_report, render_report, AssetReference, InspectionReport};
pub use version::{find_version, guess_version};
