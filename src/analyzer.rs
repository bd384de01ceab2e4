// src/analyzer.rs
// =============================================================================
// The analysis orchestrator: cache -> fetch -> extract -> classify -> cache.
//
// Within one call the stages run strictly in that order. Only the probes in
// the classify stage run in parallel. A cache hit returns the stored result
// untouched, including its timing and accessibility lists.
//
// Rust concepts:
// - Arc<dyn Trait>: the config source and cache are shared, swappable parts
// - async: fetching and probing wait on the network without blocking a thread
// =============================================================================

use crate::cache::ResultCache;
use crate::checker::{LinkChecker, LinkCheckerConfig};
use crate::config::{ConfigSource, Settings};
use crate::error::AnalyzeError;
use crate::extract::extract_html;
use crate::fetch::{http_client, FetchedPage, PageFetcher};
use crate::model::AnalysisResult;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the whole pipeline for one URL at a time.
///
/// Cheap to share behind an `Arc`: every field is either a reference-counted
/// handle or a small config value.
pub struct Analyzer {
    fetcher: PageFetcher,
    checker: LinkChecker,
    config: Arc<dyn ConfigSource>,
    cache: Arc<ResultCache>,
}

impl Analyzer {
    pub fn new(
        settings: &Settings,
        config: Arc<dyn ConfigSource>,
        cache: Arc<ResultCache>,
    ) -> Result<Self, AnalyzeError> {
        // One client for the page fetch, the render call and every probe
        // (reqwest keeps a connection pool inside, so cloning is cheap)
        let client = http_client().map_err(|e| AnalyzeError::FetchFailed {
            status: None,
            message: format!("failed to create HTTP client: {}", e),
        })?;

        // Probe failures are already traced by the checker, so no callback here
        let checker_config = LinkCheckerConfig {
            max_concurrency: settings.max_concurrency,
            timeout: settings.link_timeout,
            logger: None,
        };

        Ok(Self {
            fetcher: PageFetcher::new(client.clone(), settings),
            checker: LinkChecker::new(client, checker_config),
            config,
            cache,
        })
    }

    /// Analyzes one page, using the cache when it can.
    ///
    /// Parameters:
    ///   url: the page address, used verbatim as the cache key
    ///
    /// Returns:
    ///   Ok(AnalysisResult) either fresh or straight from the cache
    ///   Err(AnalyzeError) from the fetch or extract stage (nothing is cached then)
    pub async fn analyze_page(&self, url: &str) -> Result<AnalysisResult, AnalyzeError> {
        // Stage 0: a fresh cache entry short-circuits everything else
        if let Some(cached) = self.cache.get(url) {
            info!(url, "serving analysis from cache");
            return Ok(cached);
        }

        // Stages 1 and 2: fetch and extract
        // analysis_duration covers only these two, not the probes
        let start = Instant::now();
        let page = self.fetcher.fetch(url).await?;
        let mut result = self.extract(url, &page)?;
        result.analysis_duration = start.elapsed();

        // Stage 3: probe internal and external links together
        // Failed probes land in inaccessible_links, they never abort the analysis
        let classified = self.checker.classify(result.all_links()).await;
        result.accessible_links = classified.accessible;
        result.inaccessible_links = classified.inaccessible;

        // Stage 4: remember the finished result
        self.cache.put(url, result.clone());
        debug!(url, cached_entries = self.cache.len(), "analysis stored");
        Ok(result)
    }

    // Synchronous on purpose: the parsed tree is not Send and must be gone
    // before the next await point.
    fn extract(&self, url: &str, page: &FetchedPage) -> Result<AnalysisResult, AnalyzeError> {
        let elements = extract_html(&page.body, &page.url, self.config.as_ref())?;

        Ok(AnalysisResult {
            page_url: url.to_string(),
            html_version: page.html_version.clone(),
            title: elements.title,
            headings: elements.headings,
            internal_links: elements.internal_links,
            external_links: elements.external_links,
            has_login_form: elements.has_login_form,
            // Timing and accessibility lists are filled in by analyze_page
            ..Default::default()
        })
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does extract() take &FetchedPage and not the parsed document?
//    - scraper's Html uses non-thread-safe reference counting inside,
//      so it cannot be held across an .await in a spawned future
//    - Parsing and walking happen inside one plain function, and the tree
//      is dropped before classify() awaits
//
// 2. What does `..Default::default()` mean?
//    - Struct update syntax: every field not listed takes its default value
//
// 3. Why clone the result into the cache?
//    - The cache keeps its own copy and the caller gets the original,
//      so neither side can change what the other sees
// -----------------------------------------------------------------------------
