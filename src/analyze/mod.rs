//! HTML document analysis
//!
//! Parses a fetched page (tolerant of malformed markup, which is the normal
//! case for untrusted sites) and extracts:
//! - Doctype classification and character encoding
//! - Title, meta description, meta generator
//! - Stylesheet and script references, in document order
//!
//! Encoding resolution follows the response's Content-Type when it declares
//! a charset; otherwise, for textual media types, the body itself is sniffed
//! (BOM, then `charset=` within the first kilobyte).

use crate::fetch::FetchResult;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Classified document type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Doctype {
    Html5,
    Html401,
    Xhtml10,
    Xhtml11,
    Unknown,
}

impl std::fmt::Display for Doctype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Doctype::Html5 => "HTML 5",
            Doctype::Html401 => "HTML 4.01",
            Doctype::Xhtml10 => "XHTML 1.0",
            Doctype::Xhtml11 => "XHTML 1.1",
            Doctype::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// Kind of referenced asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Stylesheet,
    Script,
}

/// Metadata extracted from the parsed document
///
/// Optional fields are omitted from the report when absent; `doctype` is
/// `None` when the document carries no doctype declaration at all (an
/// unclassifiable declaration is `Some(Doctype::Unknown)`).
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub doctype: Option<Doctype>,
    pub encoding: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub generator: Option<String>,
}

/// One stylesheet or script element as it appeared in markup
#[derive(Debug, Clone)]
pub struct RawAsset {
    pub kind: AssetKind,

    /// The href/src value exactly as written
    pub link: String,

    /// Reconstructed markup with inline text replaced by `...`
    pub snippet: String,
}

/// Result of analyzing one fetched document
#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    pub metadata: DocumentMetadata,
    pub assets: Vec<RawAsset>,
}

/// Analyzes a fetched page's body
///
/// Never fails: the parser accepts arbitrary byte salad, and every extracted
/// field is optional. Stylesheets come before scripts in the asset list,
/// each group in document order; only elements actually carrying the
/// relevant source attribute are counted.
pub fn analyze(result: &FetchResult) -> DocumentAnalysis {
    let encoding = resolve_encoding(result);
    let text = decode_body(&result.body, &encoding);
    let document = Html::parse_document(&text);

    let metadata = DocumentMetadata {
        doctype: extract_doctype(&document),
        encoding,
        title: extract_title(&document),
        description: extract_meta(&document, "description"),
        generator: extract_meta(&document, "generator"),
    };

    let mut assets = Vec::new();
    collect_assets(
        &document,
        r#"link[rel~="stylesheet"][href]"#,
        "href",
        AssetKind::Stylesheet,
        &mut assets,
    );
    collect_assets(&document, "script[src]", "src", AssetKind::Script, &mut assets);

    tracing::debug!(assets = assets.len(), "document analyzed");

    DocumentAnalysis { metadata, assets }
}

/// Determines the response encoding label
///
/// Declared charset wins; textual media types without one are sniffed from
/// the body; everything else defaults to utf-8.
fn resolve_encoding(result: &FetchResult) -> String {
    let content_type = result.header("content-type").unwrap_or("text/html");
    let (media_type, charset) = parse_content_type(content_type);

    if let Some(charset) = charset {
        return charset;
    }

    if media_type.starts_with("text/") || media_type == "application/xhtml+xml" {
        if let Some(sniffed) = sniff_charset(&result.body) {
            return sniffed;
        }
    }

    "utf-8".to_string()
}

/// Splits a Content-Type header into media type and optional charset
fn parse_content_type(header: &str) -> (String, Option<String>) {
    let mut parts = header.split(';');
    let media_type = parts.next().unwrap_or("").trim().to_ascii_lowercase();

    let mut charset = None;
    for part in parts {
        if let Some((key, value)) = part.trim().split_once('=') {
            if key.trim().eq_ignore_ascii_case("charset") {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if !value.is_empty() {
                    charset = Some(value.to_ascii_lowercase());
                }
            }
        }
    }

    (media_type, charset)
}

/// Sniffs an encoding from the body: BOM first, then a `charset=` token in
/// the first kilobyte (covers `<meta charset=...>` and the http-equiv form)
fn sniff_charset(body: &[u8]) -> Option<String> {
    if body.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some("utf-8".to_string());
    }
    if body.starts_with(&[0xFF, 0xFE]) {
        return Some("utf-16le".to_string());
    }
    if body.starts_with(&[0xFE, 0xFF]) {
        return Some("utf-16be".to_string());
    }

    let prefix = &body[..body.len().min(1024)];
    let haystack = String::from_utf8_lossy(prefix).to_ascii_lowercase();
    let index = haystack.find("charset=")?;

    let value: String = haystack[index + "charset=".len()..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | ';' | '>' | '/'))
        .collect();

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Decodes body bytes according to the resolved encoding label
///
/// Latin-1 family bytes map directly to code points; everything else is
/// decoded as UTF-8 with replacement, which also covers unknown labels.
fn decode_body(body: &[u8], encoding: &str) -> String {
    match encoding {
        "iso-8859-1" | "latin1" | "latin-1" | "windows-1252" | "cp1252" => {
            body.iter().map(|&b| b as char).collect()
        }
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Finds the document's doctype declaration, if any
fn extract_doctype(document: &Html) -> Option<Doctype> {
    document.tree.root().children().find_map(|node| {
        if let Node::Doctype(doctype) = node.value() {
            let declaration = format!("{} {}", doctype.name(), doctype.public_id());
            Some(classify_doctype(declaration.trim()))
        } else {
            None
        }
    })
}

/// Classifies a doctype declaration string
///
/// Exact (case-insensitive) `html` means HTML 5; otherwise the first
/// matching substring among `HTML 4.01`, `XHTML 1.0`, `XHTML 1.1` wins.
pub fn classify_doctype(declaration: &str) -> Doctype {
    let upper = declaration.trim().to_uppercase();

    if upper == "HTML" {
        return Doctype::Html5;
    }

    for (needle, doctype) in [
        ("HTML 4.01", Doctype::Html401),
        ("XHTML 1.0", Doctype::Xhtml10),
        ("XHTML 1.1", Doctype::Xhtml11),
    ] {
        if upper.contains(needle) {
            return doctype;
        }
    }

    Doctype::Unknown
}

/// Extracts the first `<title>` element's trimmed text
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the first `<meta name=...>` element's non-empty content
fn extract_meta(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[name="{}"][content]"#, name)).ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

/// Collects asset elements matching a selector, in document order
fn collect_assets(
    document: &Html,
    selector: &str,
    attribute: &str,
    kind: AssetKind,
    assets: &mut Vec<RawAsset>,
) {
    let Ok(selector) = Selector::parse(selector) else {
        return;
    };

    for element in document.select(&selector) {
        if let Some(link) = element.value().attr(attribute) {
            assets.push(RawAsset {
                kind,
                link: link.to_string(),
                snippet: redacted_snippet(element),
            });
        }
    }
}

/// Rebuilds an element's markup with inline text replaced by an ellipsis
///
/// Inline script/style bodies never reach the report, only the placeholder.
fn redacted_snippet(element: ElementRef) -> String {
    let value = element.value();
    let mut snippet = format!("<{}", value.name());

    for (name, attr_value) in value.attrs() {
        snippet.push_str(&format!(" {}=\"{}\"", name, attr_value));
    }
    snippet.push('>');

    // link is a void element; script always has a closing tag
    if value.name() != "link" {
        let has_text = element.text().any(|t| !t.trim().is_empty());
        if has_text {
            snippet.push_str("...");
        }
        snippet.push_str(&format!("</{}>", value.name()));
    }

    snippet
}
