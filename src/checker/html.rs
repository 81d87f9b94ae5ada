// src/checker/html.rs
// =============================================================================
// This module extracts links, images and iframes from HTML fragments.
//
// Canvas stores page bodies, assignment descriptions, discussion messages and
// the syllabus as HTML snippets written by instructors in a rich text editor.
// They are rarely well-formed, so we rely on `scraper` (built on html5ever)
// which recovers from broken markup instead of failing.
//
// Relative references are resolved against the Canvas base URL, not against
// the page they appear on: Canvas rewrites its own links as root-relative
// paths like "/courses/42/files/7".
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::filter::is_checkable;
use super::link::{DiscoveredLink, LinkKind};

/// Link text is cut to this many characters in the report
const MAX_TEXT_CHARS: usize = 50;

const NO_TEXT_PLACEHOLDER: &str = "[Image/No Text]";
const NO_ALT_PLACEHOLDER: &str = "No Alt Text";
const IFRAME_LABEL: &str = "Iframe Embed";

/// Pulls checkable references out of HTML fragments.
///
/// Holds the base URL that relative references are joined onto and the
/// pre-parsed selectors, so one extractor can be reused for every fragment
/// of a course.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    base: Url,
    anchors: Selector,
    images: Selector,
    iframes: Selector,
}

impl LinkExtractor {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            anchors: selector("a[href]"),
            images: selector("img[src]"),
            iframes: selector("iframe[src]"),
        }
    }

    /// Extracts every checkable reference from `html`.
    ///
    /// Anchors come first in document order, then images, then iframes.
    /// Blank input gives an empty list. References that cannot be turned
    /// into an absolute URL are skipped.
    pub fn extract(
        &self,
        html: &str,
        source_location: &str,
        location_name: &str,
    ) -> Vec<DiscoveredLink> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let fragment = Html::parse_fragment(html);
        let mut links = Vec::new();

        for anchor in fragment.select(&self.anchors) {
            let text = anchor_text(anchor);
            self.push(
                &mut links,
                anchor.value().attr("href"),
                text,
                LinkKind::Link,
                source_location,
                location_name,
            );
        }

        for image in fragment.select(&self.images) {
            let alt = image.value().attr("alt").unwrap_or(NO_ALT_PLACEHOLDER);
            let text = format!("Image: {}", alt);
            self.push(
                &mut links,
                image.value().attr("src"),
                text,
                LinkKind::Image,
                source_location,
                location_name,
            );
        }

        for iframe in fragment.select(&self.iframes) {
            let text = IFRAME_LABEL.to_string();
            self.push(
                &mut links,
                iframe.value().attr("src"),
                text,
                LinkKind::Iframe,
                source_location,
                location_name,
            );
        }

        links
    }

    /// Resolves a reference to an absolute URL.
    ///
    /// Already absolute references are returned as written (minus
    /// surrounding whitespace) so they match what the instructor typed.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if Url::parse(reference).is_ok() {
            return Some(reference.to_string());
        }
        self.base.join(reference).ok().map(String::from)
    }

    fn push(
        &self,
        links: &mut Vec<DiscoveredLink>,
        reference: Option<&str>,
        text: String,
        kind: LinkKind,
        source_location: &str,
        location_name: &str,
    ) {
        let Some(reference) = reference.map(str::trim).filter(|r| is_checkable(r)) else {
            return;
        };
        let Some(url) = self.resolve(reference) else {
            tracing::debug!(reference, location_name, "skipping unresolvable reference");
            return;
        };

        links.push(DiscoveredLink {
            url,
            text,
            source_location: source_location.to_string(),
            location_name: location_name.to_string(),
            kind,
        });
    }
}

// The selectors are constants, so failing to parse one is a programmer error
fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

// Visible text of an anchor: whitespace collapsed, trimmed, truncated
fn anchor_text(anchor: ElementRef<'_>) -> String {
    let raw: String = anchor.text().collect();
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        NO_TEXT_PLACEHOLDER.to_string()
    } else {
        collapsed.chars().take(MAX_TEXT_CHARS).collect()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why parse_fragment instead of parse_document?
//    - Canvas hands us snippets, not whole documents
//    - parse_fragment wraps them in a context element without inventing
//      <head>/<body> structure around them
//
// 2. Why count characters instead of bytes when truncating?
//    - Link text is often non-ASCII (accents, CJK, emoji)
//    - Slicing a String by bytes can split a character and panic
//    - chars().take(n) always cuts on a character boundary
// -----------------------------------------------------------------------------
