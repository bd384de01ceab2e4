// src/model.rs
// =============================================================================
// The data produced by a page analysis.
//
// `AnalysisResult` is what the analyzer returns and what the cache stores.
// Its JSON form (via serde) is the output of `page-analyzer analyze --json`.
//
// Rust concepts:
// - #[derive(Serialize)]: serde generates the JSON conversion for us
// - serialize_with: swap in a custom function for a single field
// =============================================================================

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// An element whose tag name is configured as a heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub tag: String,
    /// Trimmed text content of the element's subtree
    pub text: String,
}

/// A deduplicated link.
///
/// `occurrence` is how many times `url` appeared in the raw link list it was
/// built from. `label` equals `url` unless a relabeling pass decorated it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedLink {
    pub url: String,
    pub label: String,
    pub occurrence: usize,
}

impl NamedLink {
    /// A link seen once, labeled with its own URL.
    pub fn new(url: impl Into<String>) -> Self {
        // impl Into<String> accepts both &str and String
        let url = url.into();
        Self {
            label: url.clone(),
            url,
            occurrence: 1,
        }
    }
}

/// The outcome of one page analysis.
///
/// Only Serialize is derived: results go out as JSON but never come back in.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisResult {
    pub page_url: String,
    pub html_version: String,
    /// Empty when the page has no <title>
    pub title: String,
    pub headings: Vec<Heading>,
    pub internal_links: Vec<NamedLink>,
    pub external_links: Vec<NamedLink>,
    pub accessible_links: Vec<NamedLink>,
    pub inaccessible_links: Vec<NamedLink>,
    pub has_login_form: bool,
    #[serde(serialize_with = "serialize_seconds")]
    pub analysis_duration: Duration,
}

impl AnalysisResult {
    /// Number of headings per tag name.
    pub fn heading_counts(&self) -> BTreeMap<&str, usize> {
        // BTreeMap keeps the tags sorted (h1, h2, ...) for printing
        let mut counts = BTreeMap::new();
        for heading in &self.headings {
            *counts.entry(heading.tag.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Internal links followed by external links.
    ///
    /// This is the list the classifier probes.
    pub fn all_links(&self) -> Vec<NamedLink> {
        self.internal_links
            .iter()
            .chain(self.external_links.iter())
            .cloned()
            .collect()
    }
}

// serde helper: Duration has no JSON form we want, so write fractional seconds
fn serialize_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_counts() {
        let result = AnalysisResult {
            headings: vec![
                Heading { tag: "h1".into(), text: "A".into() },
                Heading { tag: "h2".into(), text: "B".into() },
                Heading { tag: "h2".into(), text: "C".into() },
            ],
            ..Default::default()
        };
        let counts = result.heading_counts();
        assert_eq!(counts.get("h1"), Some(&1));
        assert_eq!(counts.get("h2"), Some(&2));
        assert_eq!(counts.get("h3"), None);
    }

    #[test]
    fn test_json_shape() {
        let result = AnalysisResult {
            page_url: "https://example.com/".into(),
            html_version: "HTML5".into(),
            internal_links: vec![NamedLink::new("https://example.com/a")],
            analysis_duration: Duration::from_millis(1500),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["page_url"], "https://example.com/");
        assert_eq!(json["html_version"], "HTML5");
        assert_eq!(json["internal_links"][0]["occurrence"], 1);
        assert_eq!(json["internal_links"][0]["label"], "https://example.com/a");
        assert_eq!(json["has_login_form"], false);
        assert_eq!(json["analysis_duration"], 1.5);
    }
}
