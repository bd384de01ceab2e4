// src/extract/mod.rs
// =============================================================================
// Structural extraction from a fetched document.
//
// Submodules:
// - dom: the single-pass tree walk (title, headings, links, login form)
// - links: href resolution, host classification, dedup and relabeling
//
// Nothing here touches the network: extraction works on bytes that the
// fetch module already retrieved.
// =============================================================================

// Declare submodules
mod dom;
mod links;

// Re-export the public API
pub use dom::{extract_html, PageElements};
pub use links::{relabel_duplicates, to_named_links};

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why one walk over the tree?
//    - The document is visited once, in document order
//    - Title, links, password inputs and headings are all picked up on
//      the same pass, so their relative order is the order in the page
//
// 2. Why is the parser never an error source?
//    - scraper (html5ever underneath) repairs broken markup the way a
//      browser does, so any byte sequence yields a tree
// -----------------------------------------------------------------------------
