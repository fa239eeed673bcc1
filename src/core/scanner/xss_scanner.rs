// src/core/scanner/xss_scanner.rs

//! Markup heuristics for reflected-XSS-prone pages.
//!
//! Nothing here executes scripts. Two passes run over the parsed document:
//! text-like `<input>`s without a sanitization marker, then elements with
//! inline event handler attributes.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use crate::core::models::{Finding, XssResults};
use crate::error::ParseError;

/// `type` values treated as free-text input. A missing or empty `type` is text too.
const TEXT_INPUT_TYPES: &[&str] = &["text", "search", "url", "tel", "email"];

/// Attributes whose presence marks an input as handled.
const SANITIZATION_MARKERS: &[&str] = &["sanitized", "xss-protection"];

/// Checked in this order; only the first match per element is reported.
const INLINE_EVENT_ATTRIBUTES: &[&str] =
    &["onclick", "onmouseover", "onload", "onerror", "onkeyup", "onkeydown"];

/// How far into the body a `<meta>` charset declaration is looked for.
const META_PRESCAN_BYTES: usize = 1024;

static RE_META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).unwrap()
});

/// Runs the heuristics over a fetched body.
///
/// Non-HTML responses get a single informational finding and are not flagged.
/// A body that cannot be decoded is flagged with a `parser` finding instead of
/// failing the scan.
pub fn analyze_document(content_type: &str, body: &[u8]) -> XssResults {
    let mut results = XssResults::default();

    if !content_type.contains("text/html") {
        info!(content_type, "Response is not an HTML page.");
        results.note(Finding::new(
            "document",
            "root",
            format!("not an HTML page, content-type: {}", content_type),
        ));
        return results;
    }

    let document = match parse_html(content_type, body) {
        Ok(document) => document,
        Err(e) => {
            warn!(error = %e, "Error parsing HTML.");
            results.flag(Finding::new("document", "parser", format!("error parsing HTML: {}", e)));
            return results;
        }
    };

    check_inputs(&document, &mut results);
    check_inline_handlers(&document, &mut results);

    info!(
        findings = results.details.len(),
        vulnerable = results.vulnerable,
        "HTML analysis finished."
    );
    results
}

/// Decodes the body and builds the document tree.
///
/// Bodies are expected to be UTF-8 unless a charset other than UTF-8 is
/// declared, either in the content type or, failing that, in a `<meta>` tag
/// near the top of the document. Declared legacy charsets are decoded with
/// invalid sequences replaced instead of rejected.
pub fn parse_html(content_type: &str, body: &[u8]) -> Result<Html, ParseError> {
    let charset = declared_charset(content_type).or_else(|| meta_charset(body));
    let text = match charset {
        Some(charset) if !is_utf8_label(charset) => {
            debug!(charset, "Decoding body lossily.");
            String::from_utf8_lossy(body)
        }
        _ => Cow::Borrowed(std::str::from_utf8(body).map_err(|e| ParseError(e.to_string()))?),
    };
    Ok(Html::parse_document(&text))
}

fn is_utf8_label(charset: &str) -> bool {
    charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8")
}

/// Charset named by a `<meta charset>` or `<meta http-equiv>` tag within the
/// first kilobyte of the body.
fn meta_charset(body: &[u8]) -> Option<&str> {
    let head = &body[..body.len().min(META_PRESCAN_BYTES)];
    let caps = RE_META_CHARSET.captures(head)?;
    std::str::from_utf8(caps.get(1)?.as_bytes()).ok()
}

fn declared_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Every element of the document in tree order, `<html>` included.
///
/// The iterator is lazy and can be recreated for each pass.
pub fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.root_element().descendants().filter_map(ElementRef::wrap)
}

fn element_id<'a>(element: &ElementRef<'a>) -> &'a str {
    element.value().attr("id").unwrap_or("unknown")
}

fn check_inputs(document: &Html, results: &mut XssResults) {
    for input in elements(document).filter(|el| el.value().name() == "input") {
        let input_type = input.value().attr("type").unwrap_or_default();
        if !input_type.is_empty() && !TEXT_INPUT_TYPES.contains(&input_type) {
            continue;
        }
        if SANITIZATION_MARKERS.iter().any(|marker| input.value().attr(marker).is_some()) {
            continue;
        }
        debug!(id = element_id(&input), input_type, "Unsanitized input field.");
        results.flag(Finding::new(
            "input",
            element_id(&input),
            "input field without proper sanitization attributes",
        ));
    }
}

fn check_inline_handlers(document: &Html, results: &mut XssResults) {
    for element in elements(document) {
        let handler = INLINE_EVENT_ATTRIBUTES
            .iter()
            .find(|attr| element.value().attr(attr).is_some());
        if let Some(handler) = handler {
            debug!(element = element.value().name(), handler, "Inline event handler.");
            results.flag(Finding::new(
                element.value().name(),
                element_id(&element),
                format!("inline event handler ({}) detected", handler),
            ));
        }
    }
}
