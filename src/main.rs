//! Pagescope main entry point
//!
//! Command-line shell around the inspection pipeline: argument parsing,
//! fetch-option construction, and report output. A failed page fetch is not
//! an error here; it is reported on the diagnostic stream and the process
//! still exits successfully, so callers must treat an empty report as the
//! failure signal.

use anyhow::{bail, Context};
use clap::Parser;
use pagescope::fetch::{build_http_client, resolve_user_agent, Credentials, FetchOptions};
use pagescope::report::{build_report, render_report};
use pagescope::InspectError;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Pagescope: single-page HTTP and HTML diagnostic inspector
///
/// Fetches one web page, follows its redirect chain, and reports server
/// headers, document metadata, cookies, and referenced assets with a
/// best-effort version guess for each.
#[derive(Parser, Debug)]
#[command(name = "pagescope")]
#[command(version)]
#[command(about = "Inspect a web page's headers, metadata, and assets", long_about = None)]
struct Cli {
    /// URL to inspect
    #[arg(value_name = "URL")]
    url: String,

    /// Include each asset's raw markup (inline content redacted) in the report
    #[arg(short, long)]
    verbose: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP authentication credentials (username:password)
    #[arg(short, long, value_name = "USER:PASS")]
    auth: Option<String>,

    /// Use HTTP Digest authentication instead of Basic
    #[arg(short = 'D', long, requires = "auth")]
    digest: bool,

    /// Send a custom cookie (can be used several times)
    #[arg(short, long = "cookie", value_name = "NAME=VALUE")]
    cookies: Vec<String>,

    /// User-Agent: a known alias (desktop, firefox, mobile, googlebot) or a
    /// literal header value
    #[arg(short, long, value_name = "NAME")]
    user_agent: Option<String>,

    /// HTTP proxy (http://[username[:password]@]host[:port])
    #[arg(short, long, value_name = "URL")]
    proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging();

    let url = Url::parse(&cli.url).map_err(|e| InspectError::InvalidUrl {
        url: cli.url.clone(),
        source: e,
    })?;

    let opts = build_options(&cli)?;
    let client = build_http_client(&opts)?;

    // A missing report means the page fetch failed; the fetcher has already
    // said so on stderr and the run still counts as completed.
    let Some(report) = build_report(&url, &client, &opts, cli.verbose).await else {
        return Ok(());
    };

    match &cli.output {
        Some(path) => {
            let text = render_report(&report, false);
            std::fs::write(path, text)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            let text = render_report(&report, true);
            println!();
            print!("{}", text);
        }
    }

    Ok(())
}

/// Builds per-run fetch options from the parsed arguments
fn build_options(cli: &Cli) -> anyhow::Result<FetchOptions> {
    let auth = match &cli.auth {
        Some(raw) => match raw.split_once(':') {
            Some((username, password)) => Some(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            }),
            None => bail!("--auth expects USER:PASS, got '{}'", raw),
        },
        None => None,
    };

    let mut cookies = Vec::new();
    for raw in &cli.cookies {
        let Some((name, value)) = raw.split_once('=') else {
            bail!("--cookie expects NAME=VALUE, got '{}'", raw);
        };
        cookies.push((name.to_string(), value.to_string()));
    }

    Ok(FetchOptions {
        user_agent: cli.user_agent.as_deref().map(resolve_user_agent),
        auth,
        digest: cli.digest,
        cookies,
        proxy: cli.proxy.clone(),
        timeout: Duration::from_secs(cli.timeout),
    })
}

/// Sets up the tracing subscriber on stderr
///
/// Internal events default to warnings only; `RUST_LOG` overrides. The
/// per-fetch progress lines are not tracing events, they are part of the
/// fetcher's contract and always appear.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pagescope=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
