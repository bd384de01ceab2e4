// src/extract/links.rs
// =============================================================================
// Link resolution, internal/external classification and deduplication.
//
// The occurrence count on `NamedLink` is the primary record of duplicates.
// Decorated labels ("<url> (3)") are a separate presentation step, applied
// only when a caller asks for `relabel_duplicates`.
// =============================================================================

use crate::model::NamedLink;
use std::collections::HashMap;
use url::Url;

/// Resolves an href against the page URL.
///
/// Returns None for empty values and for values that cannot be resolved.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    // Whitespace around an href is common in hand-written HTML
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    // join() handles absolute, root-relative ("/x"), relative ("../x")
    // and protocol-relative ("//host/x") references
    base.join(href).ok()
}

/// Host comparison ignoring case and port.
///
/// `Url` keeps the port outside `host_str()` and lower-cases domain names,
/// so comparing hosts is enough. Links without a host (mailto:, javascript:)
/// only match a base that also has none.
pub fn is_internal(base: &Url, link: &Url) -> bool {
    let base_host = base.host_str().map(str::to_ascii_lowercase);
    let link_host = link.host_str().map(str::to_ascii_lowercase);
    base_host == link_host
}

/// Groups a raw link list by exact URL, keeping first-occurrence order.
pub fn to_named_links(raw: &[String]) -> Vec<NamedLink> {
    // URL -> position in `named`, so each lookup is O(1)
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut named: Vec<NamedLink> = Vec::new();

    for link in raw {
        match index.get(link.as_str()) {
            Some(&i) => named[i].occurrence += 1,
            None => {
                index.insert(link.as_str(), named.len());
                named.push(NamedLink::new(link.clone()));
            }
        }
    }

    named
}

/// Decorates labels of repeated links with their total occurrence count.
///
/// Entries sharing a URL are folded together first, so the count stays
/// correct even when the input was concatenated from several lists.
pub fn relabel_duplicates(links: &[NamedLink]) -> Vec<NamedLink> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut merged: Vec<NamedLink> = Vec::new();

    for link in links {
        match index.get(link.url.as_str()) {
            Some(&i) => merged[i].occurrence += link.occurrence,
            None => {
                index.insert(link.url.as_str(), merged.len());
                merged.push(NamedLink {
                    occurrence: link.occurrence,
                    ..NamedLink::new(link.url.clone())
                });
            }
        }
    }

    // Labels are written once the counts are final
    for link in &mut merged {
        link.label = if link.occurrence > 1 {
            format!("{} ({})", link.url, link.occurrence)
        } else {
            link.url.clone()
        };
    }

    merged
}
