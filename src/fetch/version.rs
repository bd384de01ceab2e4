// src/fetch/version.rs
// =============================================================================
// HTML version detection from the DOCTYPE declaration.
//
// Only a short prefix of the document is inspected, so this never needs a
// full parse. Match order matters: the HTML5 check runs first, then the
// known legacy doctypes, then the generic `<!doctype ...>` extraction.
//
// Rust concepts:
// - Slices: &data[..n] views part of a buffer without copying it
// - OnceLock: a value computed once and then shared by every caller
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;

// A DOCTYPE must come first, so 256 bytes is plenty
const SNIFF_LEN: usize = 256;

pub const UNKNOWN_DOCTYPE: &str = "Unknown or Custom DOCTYPE";

// (substring, label), checked in order after the HTML5 check
const KNOWN_DOCTYPES: &[(&str, &str)] = &[
    ("html 4.01 transitional", "HTML 4.01 Transitional"),
    ("html 4.01//en", "HTML 4.01 Strict"),
    ("xhtml 1.0 strict", "XHTML 1.0 Strict"),
    ("xhtml 1.0 transitional", "XHTML 1.0 Transitional"),
];

// Compiled once on first use, then shared
// OnceLock is the std way to build a lazily-initialized static
fn doctype_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Constant pattern, known to compile
        Regex::new(r"(?i)<!doctype\s+([^>]+)>").expect("valid doctype regex")
    })
}

/// Detects the HTML version of a document from its leading bytes.
///
/// Returns one of "HTML5", a known legacy label, "Unknown DOCTYPE: <text>"
/// for any other declaration, or `UNKNOWN_DOCTYPE` when there is none.
pub fn detect_html_version(data: &[u8]) -> String {
    // Leading whitespace would otherwise eat into the prefix
    let trimmed = trim_ascii_whitespace(data);
    let prefix = &trimmed[..trimmed.len().min(SNIFF_LEN)];
    // Lower-case once so every comparison below ignores case
    let snippet = String::from_utf8_lossy(prefix).to_lowercase();

    // "<!doctype html>" anywhere in the prefix wins over everything else
    if snippet.contains("<!doctype html>") {
        return "HTML5".to_string();
    }

    // Legacy doctypes carry a public identifier we can match on
    for (needle, label) in KNOWN_DOCTYPES {
        if snippet.contains(needle) {
            return label.to_string();
        }
    }

    // Some other DOCTYPE: report its text (lower-cased, as scanned)
    match doctype_regex().captures(&snippet) {
        Some(caps) => format!("Unknown DOCTYPE: {}", &caps[1]),
        None => UNKNOWN_DOCTYPE.to_string(),
    }
}

// Byte-level trim; the prefix may cut a UTF-8 sequence, so no &str here
fn trim_ascii_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let end = data
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &data[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_doctypes() {
        let cases = [
            ("<!DOCTYPE html><html><head></head><body></body></html>", "HTML5"),
            (
                r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#,
                "HTML 4.01 Transitional",
            ),
            (r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN">"#, "HTML 4.01 Strict"),
            (r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN">"#, "XHTML 1.0 Strict"),
            (
                r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN">"#,
                "XHTML 1.0 Transitional",
            ),
        ];
        for (html, expected) in cases {
            assert_eq!(detect_html_version(html.as_bytes()), expected, "input: {}", html);
        }
    }

    #[test]
    fn test_html5_wins_over_generic_fallback() {
        assert_eq!(detect_html_version(b"<!DOCTYPE html><html>"), "HTML5");
        assert_eq!(detect_html_version(b"\n\n   <!doctype HTML>\n<html>"), "HTML5");
    }

    #[test]
    fn test_unknown_doctype_is_echoed_lowercase() {
        assert_eq!(
            detect_html_version(b"<!DOCTYPE WeirdHTML SYSTEM 'x.dtd'>"),
            "Unknown DOCTYPE: weirdhtml system 'x.dtd'"
        );
    }

    #[test]
    fn test_no_doctype() {
        assert_eq!(detect_html_version(b"<html>"), UNKNOWN_DOCTYPE);
        assert_eq!(detect_html_version(b""), UNKNOWN_DOCTYPE);
    }

    #[test]
    fn test_doctype_beyond_prefix_is_ignored() {
        let mut page = " ".repeat(10);
        page.push_str(&"x".repeat(300));
        page.push_str("<!DOCTYPE html>");
        assert_eq!(detect_html_version(page.as_bytes()), UNKNOWN_DOCTYPE);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let snippet = b"<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\">";
        assert_eq!(detect_html_version(snippet), detect_html_version(snippet));
    }
}
