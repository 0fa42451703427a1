//! Plain-text report rendering
//!
//! Renders an [`InspectionReport`] into the sectioned text format shown to
//! the operator. Presence checks happen here, not in the data model: a
//! header line is printed only when the corresponding value exists.

use crate::report::InspectionReport;
use colored::Colorize;
use std::fmt::Write;

const SECONDS_PER_DAY: u64 = 86_400;

/// Renders a report as display text
///
/// `use_color` bolds the final path segment of each asset's display name;
/// pass `false` when the report goes to a file.
pub fn render_report(report: &InspectionReport, use_color: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", report.final_url);
    let _ = writeln!(out, "{}", "=".repeat(report.final_url.len()));

    if let Some(server) = &report.headers.server {
        let _ = writeln!(out, "* Server: {}", server);
    }
    if let Some(powered_by) = &report.headers.x_powered_by {
        let _ = writeln!(out, "* X-Powered-By: {}", powered_by);
    }
    if let Some(max_age) = report.headers.hsts_max_age {
        let _ = writeln!(
            out,
            "* Strict-Transport-Security: max-age={} ({} days)",
            max_age,
            max_age / SECONDS_PER_DAY
        );
    }
    if let Some(content_type) = &report.headers.content_type {
        let _ = writeln!(out, "* Content-Type: {}", content_type);
    }

    let _ = writeln!(out, "* Encoding: {}", report.metadata.encoding);

    if let Some(doctype) = report.metadata.doctype {
        let _ = writeln!(out, "* DocType: {}", doctype);
    }
    if let Some(title) = &report.metadata.title {
        let _ = writeln!(out, "* Title: {}", title);
    }
    if let Some(description) = &report.metadata.description {
        let _ = writeln!(out, "* Description: {}", description);
    }
    if let Some(generator) = &report.metadata.generator {
        let _ = writeln!(out, "* Generator: {}", generator);
    }

    let _ = writeln!(out, "\nCookies:\n--------");
    for (index, (name, value)) in report.cookies.iter().enumerate() {
        let _ = writeln!(out, "{}. {} = {}", index + 1, name, value);
    }
    if report.cookies.is_empty() {
        let _ = writeln!(out, "Nope");
    }

    let _ = writeln!(out, "\nStyle sheets:\n-------------");
    render_asset_section(&mut out, &report.stylesheets, use_color);

    let _ = writeln!(out, "\nScripts:\n--------");
    render_asset_section(&mut out, &report.scripts, use_color);

    out
}

/// Renders one numbered asset section, `Nope` when empty
fn render_asset_section(
    out: &mut String,
    assets: &[crate::report::AssetReference],
    use_color: bool,
) {
    for (index, asset) in assets.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} (version {})",
            index + 1,
            emphasize_basename(&asset.display_name, use_color),
            asset.version
        );
        if let Some(markup) = &asset.markup {
            let _ = writeln!(out, "   {}", markup);
        }
    }
    if assets.is_empty() {
        let _ = writeln!(out, "Nope");
    }
}

/// Bolds the final path segment of a display name for terminal output
///
/// Pure presentation: the stored display name is never modified.
fn emphasize_basename(display_name: &str, use_color: bool) -> String {
    if !use_color {
        return display_name.to_string();
    }

    match display_name.rfind('/') {
        Some(index) if index + 1 < display_name.len() => {
            let (prefix, basename) = display_name.split_at(index + 1);
            format!("{}{}", prefix, basename.bold())
        }
        _ => display_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{AssetKind, DocumentMetadata, Doctype};
    use crate::report::{AssetReference, HeaderHighlights};

    fn base_report() -> InspectionReport {
        InspectionReport {
            final_url: "https://example.com/".to_string(),
            headers: HeaderHighlights {
                server: None,
                x_powered_by: None,
                content_type: None,
                hsts_max_age: None,
            },
            metadata: DocumentMetadata {
                doctype: None,
                encoding: "utf-8".to_string(),
                title: None,
                description: None,
                generator: None,
            },
            cookies: Vec::new(),
            stylesheets: Vec::new(),
            scripts: Vec::new(),
        }
    }

    fn asset(display_name: &str, version: &str) -> AssetReference {
        AssetReference {
            kind: AssetKind::Script,
            raw_link: display_name.to_string(),
            absolute_url: format!("https://example.com{}", display_name),
            display_name: display_name.to_string(),
            version: version.to_string(),
            markup: None,
        }
    }

    #[test]
    fn test_url_underlined() {
        let text = render_report(&base_report(), false);
        assert!(text.starts_with("https://example.com/\n====================\n"));
    }

    #[test]
    fn test_absent_headers_omitted() {
        let text = render_report(&base_report(), false);
        assert!(!text.contains("* Server:"));
        assert!(!text.contains("* X-Powered-By:"));
        assert!(!text.contains("* Content-Type:"));
        assert!(!text.contains("* DocType:"));
        assert!(text.contains("* Encoding: utf-8"));
    }

    #[test]
    fn test_present_headers_rendered() {
        let mut report = base_report();
        report.headers.server = Some("nginx/1.24".to_string());
        report.metadata.title = Some("Hello".to_string());
        report.metadata.doctype = Some(Doctype::Html5);

        let text = render_report(&report, false);
        assert!(text.contains("* Server: nginx/1.24"));
        assert!(text.contains("* DocType: HTML 5"));
        assert!(text.contains("* Title: Hello"));
    }

    #[test]
    fn test_hsts_days_conversion() {
        let mut report = base_report();
        report.headers.hsts_max_age = Some(31_536_000);

        let text = render_report(&report, false);
        assert!(text.contains("* Strict-Transport-Security: max-age=31536000 (365 days)"));
    }

    #[test]
    fn test_unknown_doctype_still_printed() {
        let mut report = base_report();
        report.metadata.doctype = Some(Doctype::Unknown);

        let text = render_report(&report, false);
        assert!(text.contains("* DocType: unknown"));
    }

    #[test]
    fn test_empty_cookies_render_nope() {
        let text = render_report(&base_report(), false);
        assert!(text.contains("Cookies:\n--------\nNope"));
    }

    #[test]
    fn test_cookies_numbered_in_order() {
        let mut report = base_report();
        report.cookies = vec![
            ("session".to_string(), "abc".to_string()),
            ("theme".to_string(), "dark".to_string()),
        ];

        let text = render_report(&report, false);
        assert!(text.contains("1. session = abc\n2. theme = dark"));
    }

    #[test]
    fn test_empty_asset_sections_render_nope() {
        let text = render_report(&base_report(), false);
        assert!(text.contains("Style sheets:\n-------------\nNope"));
        assert!(text.contains("Scripts:\n--------\nNope"));
    }

    #[test]
    fn test_assets_numbered_with_version() {
        let mut report = base_report();
        report.scripts = vec![asset("/js/app.js", "1.2.3"), asset("/js/lib.js", "unknown")];

        let text = render_report(&report, false);
        assert!(text.contains("1. /js/app.js (version 1.2.3)"));
        assert!(text.contains("2. /js/lib.js (version unknown)"));
    }

    #[test]
    fn test_verbose_markup_indented_under_asset() {
        let mut report = base_report();
        let mut script = asset("/js/app.js", "unknown");
        script.markup = Some(r#"<script src="/js/app.js"></script>"#.to_string());
        report.scripts = vec![script];

        let text = render_report(&report, false);
        assert!(text.contains("1. /js/app.js (version unknown)\n   <script src=\"/js/app.js\"></script>"));
    }

    #[test]
    fn test_no_color_output_is_plain() {
        let mut report = base_report();
        report.scripts = vec![asset("/js/app.js", "1.0.0")];

        let text = render_report(&report, false);
        assert!(!text.contains('\u{1b}'));
    }
}
