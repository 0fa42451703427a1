//! HTTP fetcher
//!
//! This module performs every network request pagescope makes:
//! - Building the HTTP client from operator-supplied options
//! - Single GET requests with redirects followed manually
//! - Per-hop diagnostics printed to stderr as they happen
//! - Cookie collection across the redirect chain
//! - Error classification (connection / timeout / HTTP status)
//!
//! Redirects are handled manually (`Policy::none`) so the full chain is
//! observable: one [`HopRecord`] per hop, including the final response.

mod options;

pub use options::{
    resolve_user_agent, Credentials, FetchOptions, DEFAULT_TIMEOUT, USER_AGENT_ALIASES,
};

use crate::{FetchError, InspectError};
use diqwest::WithDigestAuth;
use reqwest::header::{HeaderMap, COOKIE, LOCATION, SET_COOKIE};
use reqwest::{redirect::Policy, Client, Response};
use std::time::{Duration, Instant};
use url::Url;

/// Maximum number of redirect hops before giving up
pub const MAX_REDIRECT_HOPS: usize = 10;

/// One hop of the redirect chain, including the final response
#[derive(Debug, Clone)]
pub struct HopRecord {
    /// HTTP status code of this hop
    pub status: u16,

    /// Reason phrase for the status code
    pub reason: String,

    /// Time spent on this hop
    pub elapsed: Duration,

    /// Absolute target URL when this hop was a redirect
    pub redirect_to: Option<String>,
}

/// Result of a successful fetch
///
/// Immutable once returned; the final hop's status is always in the 2xx
/// range, anything else surfaces as a [`FetchError`] instead.
#[derive(Debug)]
pub struct FetchResult {
    /// Final URL after following redirects
    pub final_url: Url,

    /// Every hop taken, in order, final response last
    pub hops: Vec<HopRecord>,

    /// Response headers of the final hop (case-insensitive keys)
    pub headers: HeaderMap,

    /// Raw response body bytes
    pub body: Vec<u8>,

    /// Cookies set across the whole chain, in response order
    pub cookies: Vec<(String, String)>,
}

impl FetchResult {
    /// Returns a response header as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Builds the HTTP client used for all requests of a run
///
/// Proxy and timeout come from the options; redirects are disabled so the
/// fetcher can record each hop itself.
///
/// # Errors
///
/// Returns [`InspectError::InvalidProxy`] for an unparseable proxy URL and
/// [`InspectError::Client`] if reqwest refuses the configuration.
pub fn build_http_client(opts: &FetchOptions) -> Result<Client, InspectError> {
    let user_agent = opts
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("pagescope/{}", env!("CARGO_PKG_VERSION")));

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .timeout(opts.timeout)
        .connect_timeout(opts.timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &opts.proxy {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| InspectError::InvalidProxy {
            proxy: proxy.clone(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(InspectError::Client)
}

/// Fetches a URL, following redirects and recording every hop
///
/// Progress is printed to stderr as it happens: `GET <url>... ` before each
/// attempt, then `<status> <reason> [<elapsed> sec]` per hop. Redirect hops
/// print the next target with an arrow prefix that grows with hop depth.
/// Failures print `connection error!` or `timeout!` in place of the status
/// line. This output is part of the fetcher's contract, not debug logging.
///
/// # Arguments
///
/// * `url` - Absolute HTTP/HTTPS URL to fetch
/// * `client` - Client built by [`build_http_client`]
/// * `opts` - Auth and cookies applied to every hop
///
/// # Errors
///
/// * [`FetchError::Connection`] on transport-level failure
/// * [`FetchError::Timeout`] when the configured deadline is exceeded
/// * [`FetchError::HttpStatus`] when the final hop is not 2xx
/// * [`FetchError::RedirectLimit`] past [`MAX_REDIRECT_HOPS`] hops
pub async fn fetch(
    url: &Url,
    client: &Client,
    opts: &FetchOptions,
) -> Result<FetchResult, FetchError> {
    let mut current = url.clone();
    let mut hops: Vec<HopRecord> = Vec::new();
    let mut cookies: Vec<(String, String)> = Vec::new();

    eprint!("GET {}... ", current);

    for depth in 0..MAX_REDIRECT_HOPS {
        let started = Instant::now();
        let response = match send_request(client, &current, opts).await {
            Ok(response) => response,
            Err(e) => {
                match e {
                    FetchError::Timeout => eprintln!("timeout!"),
                    _ => eprintln!("connection error!"),
                }
                return Err(e);
            }
        };
        let elapsed = started.elapsed();

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        eprintln!(
            "{} {} [{:.3} sec]",
            status.as_u16(),
            reason,
            elapsed.as_secs_f64()
        );

        collect_cookies(response.headers(), &mut cookies);

        let redirect_to = if status.is_redirection() {
            redirect_target(&response, &current)
        } else {
            None
        };

        hops.push(HopRecord {
            status: status.as_u16(),
            reason,
            elapsed,
            redirect_to: redirect_to.as_ref().map(|u| u.to_string()),
        });

        match redirect_to {
            Some(next) => {
                // Arrow count grows with hop depth: >>, >>>, ...
                eprint!("{} GET {}... ", ">".repeat(depth + 2), next);
                current = next;
            }
            None => {
                if !status.is_success() {
                    return Err(FetchError::HttpStatus(status.as_u16()));
                }

                let headers = response.headers().clone();
                let body = response
                    .bytes()
                    .await
                    .map_err(classify_transport_error)?
                    .to_vec();

                tracing::debug!(
                    url = %current,
                    hops = hops.len(),
                    bytes = body.len(),
                    "fetch complete"
                );

                return Ok(FetchResult {
                    final_url: current,
                    hops,
                    headers,
                    body,
                    cookies,
                });
            }
        }
    }

    eprintln!("too many redirects!");
    Err(FetchError::RedirectLimit(MAX_REDIRECT_HOPS))
}

/// Sends a single request with the configured auth and cookies applied
async fn send_request(
    client: &Client,
    url: &Url,
    opts: &FetchOptions,
) -> Result<Response, FetchError> {
    let mut builder = client.get(url.clone());

    if !opts.cookies.is_empty() {
        builder = builder.header(COOKIE, opts.cookie_header());
    }

    match &opts.auth {
        Some(credentials) if opts.digest => builder
            .send_with_digest_auth(&credentials.username, &credentials.password)
            .await
            .map_err(|e| match e {
                diqwest::error::Error::Reqwest(e) => classify_transport_error(e),
                other => FetchError::Connection(other.to_string()),
            }),
        Some(credentials) => builder
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(classify_transport_error),
        None => builder.send().await.map_err(classify_transport_error),
    }
}

/// Maps a reqwest transport error onto the fetcher's failure kinds
fn classify_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Connection(e.to_string())
    }
}

/// Resolves the `Location` header of a redirect response against the
/// current URL
///
/// A redirect without a usable `Location` is treated as a final response.
fn redirect_target(response: &Response, current: &Url) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;

    match Url::parse(location) {
        Ok(absolute) => Some(absolute),
        Err(_) => current.join(location).ok(),
    }
}

/// Collects `Set-Cookie` values into an ordered name/value list
///
/// A cookie re-set later in the chain keeps its original position but takes
/// the newer value.
fn collect_cookies(headers: &HeaderMap, cookies: &mut Vec<(String, String)>) {
    for value in headers.get_all(SET_COOKIE) {
        let Ok(raw) = value.to_str() else {
            tracing::warn!("skipping non-UTF-8 Set-Cookie header");
            continue;
        };

        let pair = raw.split(';').next().unwrap_or("");
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim().to_string();
        let value = value.trim().to_string();

        if let Some(existing) = cookies.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value;
        } else {
            cookies.push((name, value));
        }
    }
}
