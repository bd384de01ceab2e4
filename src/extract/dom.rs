// src/extract/dom.rs
// =============================================================================
// The DOM extraction walk.
//
// One pre-order pass over the parsed tree visits every element exactly once,
// in document order, and collects:
// - the page title (first <title> wins)
// - links, split into internal and external by host
// - whether any <input type="password"> exists anywhere
// - headings, i.e. elements whose tag name is in the configured set
//
// The parser (html5ever via scraper) never fails: broken markup still gives
// a best-effort tree. The only failure here is a missing heading config.
//
// Rust concepts:
// - let-else: skip text and comment nodes with one early `continue`
// - Match guards: `name if ...` matches any tag in the heading set
// =============================================================================

use super::links::{is_internal, resolve_href, to_named_links};
use crate::config::ConfigSource;
use crate::error::AnalyzeError;
use crate::model::{Heading, NamedLink};
use scraper::{ElementRef, Html, Node};
use tracing::debug;
use url::Url;

/// Everything the walk extracts from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageElements {
    pub title: String,
    pub headings: Vec<Heading>,
    pub internal_links: Vec<NamedLink>,
    pub external_links: Vec<NamedLink>,
    pub has_login_form: bool,
}

/// Parses raw bytes and runs the extraction walk.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn extract_html(
    body: &[u8],
    base: &Url,
    config: &dyn ConfigSource,
) -> Result<PageElements, AnalyzeError> {
    let document = Html::parse_document(&String::from_utf8_lossy(body));
    extract(&document, base, config)
}

/// Walks an already-parsed document.
///
/// Parameters:
///   document: the parsed tree (borrowed, it is only read)
///   base: the page URL, used to resolve relative hrefs
///   config: where the heading list comes from
///
/// Returns:
///   Ok(PageElements) with links deduplicated per list
///   Err(ConfigUnavailable) when the heading list cannot be loaded
pub fn extract(
    document: &Html,
    base: &Url,
    config: &dyn ConfigSource,
) -> Result<PageElements, AnalyzeError> {
    // One snapshot for the whole walk
    let tags = config.load()?;
    debug!(headings = ?tags.headings, "loaded heading config");

    let mut page = PageElements::default();
    let mut title_seen = false;
    let mut raw_internal: Vec<String> = Vec::new();
    let mut raw_external: Vec<String> = Vec::new();

    // descendants() is a pre-order walk: parents before children,
    // siblings left to right, which is document order
    for node in document.tree.root().descendants() {
        // Text, comments and the doctype carry nothing we collect
        let Node::Element(element) = node.value() else {
            continue;
        };

        match element.name() {
            // Only the first <title> counts, even an empty one
            // The text is its first text child, kept as-is
            "title" => {
                if !title_seen {
                    title_seen = true;
                    if let Some(text) = node.first_child().and_then(|c| c.value().as_text()) {
                        page.title = text.to_string();
                    }
                }
            }
            // A link is an <a> whose href resolves against the base URL
            // Anchors without href, or with an unresolvable one, are skipped
            "a" => {
                let resolved = element.attr("href").and_then(|href| resolve_href(base, href));
                if let Some(link) = resolved {
                    let full = link.to_string();
                    if is_internal(base, &link) {
                        raw_internal.push(full);
                    } else {
                        raw_external.push(full);
                    }
                }
            }
            // Any password field marks the page as having a login form
            "input" => {
                if element
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("password"))
                {
                    page.has_login_form = true;
                }
            }
            // A configured heading: its text is every descendant text node
            // joined together, then trimmed
            name if tags.is_heading(name) => {
                let text = ElementRef::wrap(node)
                    .map(|el| el.text().collect::<String>())
                    .unwrap_or_default();
                page.headings.push(Heading {
                    tag: name.to_string(),
                    text: text.trim().to_string(),
                });
            }
            // Everything else is ignored
            _ => {}
        }
    }

    // Collapse repeats into one entry per URL with an occurrence count
    page.internal_links = to_named_links(&raw_internal);
    page.external_links = to_named_links(&raw_external);

    debug!(
        internal = raw_internal.len(),
        external = raw_external.len(),
        headings = page.headings.len(),
        "extraction finished"
    );
    Ok(page)
}
