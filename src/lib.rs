// src/lib.rs
// =============================================================================
// page-analyzer: fetch a page, extract its structure, check its links.
//
// The pipeline is fetch -> extract -> classify, with a result cache in front:
// - fetch: primary GET, bot-block detection, render-service fallback
// - extract: one DOM walk for title, headings, links and login forms
// - checker: bounded-concurrency HEAD probes splitting links by reachability
// - cache: TTL-bounded memoization keyed by requested URL
// - analyzer: wires the stages together behind `Analyzer::analyze_page`
// =============================================================================

// Declare the modules that make up the library
pub mod analyzer;
pub mod cache;
pub mod checker;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod model;

// Re-export the types most callers need at the crate root
pub use analyzer::Analyzer;
pub use cache::ResultCache;
pub use checker::{classify_links_concurrently, LinkCheckerConfig};
pub use error::AnalyzeError;
pub use model::{AnalysisResult, Heading, NamedLink};
