// src/fetch/mod.rs
// =============================================================================
// Retrieving the document to analyze.
//
// Submodules:
// - pipeline: primary GET with bot-block detection and render fallback
// - render: client for the external headless render service
// - version: DOCTYPE sniffing on the returned bytes
//
// Only the pipeline is public: callers ask for a page and get back bytes
// plus the detected HTML version, whichever path produced them.
// =============================================================================

mod pipeline;
mod render;
mod version;

// Re-export public items from submodules
pub use pipeline::{http_client, FetchedPage, PageFetcher};
