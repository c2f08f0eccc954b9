//! HTML text extraction with `scraper`.
//!
//! Used for inline bodies (feed nodes that carry escaped HTML) and for the
//! content block of a linked article page.

use crate::error::ExtractError;
use crate::utils::normalize_whitespace;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_.:-]+)"#).unwrap()
});

/// Decode a fetched HTML page to text.
///
/// A byte order mark wins, then a `<meta charset>` (or `http-equiv`
/// content type) in the first 1024 bytes. Without either the page is read
/// as UTF-8, falling back to Windows-1252 when it is not valid UTF-8.
pub fn decode_page(bytes: &[u8]) -> String {
    let head = &bytes[..bytes.len().min(1024)];
    let declared = META_CHARSET
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    let encoding = match declared {
        Some(encoding) => encoding,
        None if std::str::from_utf8(bytes).is_ok() => UTF_8,
        None => WINDOWS_1252,
    };
    let (text, used, had_errors) = encoding.decode(bytes);
    debug!(encoding = used.name(), had_errors, "Decoded linked page");
    text.into_owned()
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Strip markup from an HTML fragment and return its plain text.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    element_text(fragment.root_element())
}

/// Text of the first `tag` element whose `id` is `id` in a full HTML page.
#[instrument(level = "info", skip(html), fields(bytes = html.len()))]
pub fn block_text(html: &str, tag: &str, id: &str) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);
    let css = format!("{}[id=\"{}\"]", tag, id.replace('\\', "\\\\").replace('"', "\\\""));
    let selector = Selector::parse(&css)
        .map_err(|e| ExtractError::Parse(format!("selector {}: {}", css, e)))?;

    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| ExtractError::Parse(format!("linked page has no <{} id={:?}>", tag, id)))?;
    let text = element_text(element);
    info!(chars = text.len(), "Parsed linked page");
    Ok(text)
}
