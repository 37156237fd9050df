//! Link extraction from fetched pages
//!
//! The engine only depends on the [`LinkExtractor`] trait. [`HtmlLinkExtractor`]
//! is the default implementation:
//! - Follows `<a href>` anchors and `<link rel="canonical">`
//! - Skips `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only hrefs
//! - Skips anchors carrying the `download` attribute
//! - Keeps only links on the page's own host and port, normalized and deduplicated

use crate::crawler::FetchResult;
use crate::url::{is_same_domain, normalize_parsed};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts in-domain links from a successful fetch
///
/// Implementations must not panic on malformed content; they return whatever
/// links they can recover, possibly none.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, result: &FetchResult, page_url: &Url) -> Vec<Url>;
}

/// HTML link extractor built on scraper
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, result: &FetchResult, page_url: &Url) -> Vec<Url> {
        let Some(content) = result.content.as_deref() else {
            return Vec::new();
        };
        if !is_html(result.content_type.as_deref()) {
            return Vec::new();
        }

        let html = String::from_utf8_lossy(content);
        extract_from_html(&html, page_url)
    }
}

/// HTML bodies and bodies without a Content-Type are parsed
fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.trim().is_empty() || ct.contains("text/html") || ct.contains("application/xhtml+xml")
        }
    }
}

/// Parses an HTML document and returns its in-domain links in document order
pub fn extract_from_html(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    candidate_hrefs(&document)
        .into_iter()
        .filter_map(|href| resolve_link(&href, page_url))
        .filter(|link| is_same_domain(link, page_url))
        .filter(|link| seen.insert(link.as_str().to_string()))
        .collect()
}

/// Collects hrefs from anchors, then canonical links
fn candidate_hrefs(document: &Html) -> Vec<String> {
    let mut hrefs = Vec::new();

    if let Ok(anchors) = Selector::parse("a[href]") {
        hrefs.extend(
            document
                .select(&anchors)
                .filter(|element| element.value().attr("download").is_none())
                .filter_map(|element| element.value().attr("href"))
                .map(str::to_string),
        );
    }

    if let Ok(canonical) = Selector::parse("link[rel='canonical'][href]") {
        hrefs.extend(
            document
                .select(&canonical)
                .filter_map(|element| element.value().attr("href"))
                .map(str::to_string),
        );
    }

    hrefs
}

/// Resolves an href against the page URL, returning a normalized absolute URL
///
/// Returns None for special schemes, fragment-only links, unparsable hrefs
/// and anything that is not http(s) after resolution.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_parsed(absolute).ok()
}
