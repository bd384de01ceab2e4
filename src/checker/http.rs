// src/checker/http.rs
// =============================================================================
// This module checks whether links are reachable.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Any status in [200, 400) counts as accessible, redirects included
// - Everything else (404, 500, timeout, refused connection, bad URL) counts
//   as inaccessible and is never surfaced as an error
// - Runs one task per link, bounded by a semaphore, and joins them all
//   before returning
//
// Rust concepts:
// - JoinSet: a group of spawned tasks we can wait on as a whole
// - Semaphore: a pool of permits limiting how many probes run at once
// - Arc<Mutex<_>>: shared, lock-protected output lists
// =============================================================================

use crate::model::NamedLink;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Url;

/// Receives one human-readable message per failed probe.
pub type DiagnosticFn = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Clone)]
pub struct LinkCheckerConfig {
    /// Upper bound on simultaneously in-flight probes (values below 1 act as 1)
    pub max_concurrency: usize,
    /// Timeout for each individual probe
    pub timeout: Duration,
    /// Optional failure callback; None = silent
    pub logger: Option<DiagnosticFn>,
}

impl Default for LinkCheckerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            timeout: Duration::from_secs(5),
            logger: None,
        }
    }
}

impl std::fmt::Debug for LinkCheckerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkCheckerConfig")
            .field("max_concurrency", &self.max_concurrency)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Why a probe counted as inaccessible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The server answered with a status outside [200, 400)
    Status(u16),
    /// Request timed out
    Timeout,
    /// Could not connect (refused, DNS, TLS handshake)
    Connect,
    /// The link could not be turned into a request
    InvalidUrl,
    /// Other transport error
    Other,
}

/// A failed accessibility probe. Always recovered locally.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProbeFailed {
    pub kind: ProbeFailure,
    pub message: String,
}

/// The two halves of a classification. Order within each list is
/// completion order, not input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classified {
    pub accessible: Vec<NamedLink>,
    pub inaccessible: Vec<NamedLink>,
}

#[derive(Debug, Clone)]
pub struct LinkChecker {
    client: Client,
    config: LinkCheckerConfig,
}

impl LinkChecker {
    pub fn new(client: Client, config: LinkCheckerConfig) -> Self {
        Self { client, config }
    }

    /// Probes a single link with a HEAD request.
    ///
    /// Parameters:
    ///   link: the absolute URL to probe (borrowed, we only read it)
    ///
    /// Returns:
    ///   Ok(status) when the link answered with a status in [200, 400),
    ///   Err(ProbeFailed) for everything else
    pub async fn probe(&self, link: &str) -> Result<u16, ProbeFailed> {
        // Parse first so a malformed link fails without touching the network
        let target = Url::parse(link).map_err(|e| ProbeFailed {
            kind: ProbeFailure::InvalidUrl,
            message: format!("HEAD request creation failed for {}: {}", link, e),
        })?;

        // HEAD asks for headers only, so no body is downloaded
        // The timeout is per request, on top of the shared client
        let response = self
            .client
            .head(target)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| categorize_error(link, e))?;

        analyze_response(link, response.status())
    }

    /// Classifies every link as accessible or inaccessible.
    ///
    /// Parameters:
    ///   links: the deduplicated links to probe (owned, each one moves into its task)
    ///
    /// Returns:
    ///   Classified with exactly `links.len()` entries across both lists
    ///
    /// One task is spawned per link; each holds a semaphore permit only while
    /// its probe is in flight. Returns once every task has finished.
    pub async fn classify(&self, links: Vec<NamedLink>) -> Classified {
        let total = links.len();

        // The semaphore is our permit pool: at most max_concurrency probes run
        // at the same time. A value of 0 would block forever, so treat it as 1
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));

        // Both output lists live behind one mutex shared by every task
        let results = Arc::new(Mutex::new(Classified::default()));

        // JoinSet keeps handles to all spawned tasks so we can wait for them
        let mut tasks = JoinSet::new();

        for link in links {
            // Each task gets its own handle to the shared state
            // (Arc::clone only bumps a reference count)
            let permits = Arc::clone(&permits);
            let results = Arc::clone(&results);
            let checker = self.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquire only fails in theory
                let permit = permits.acquire_owned().await.ok();
                let outcome = checker.probe(&link.url).await;
                // Give the permit back as soon as the network part is done
                drop(permit);

                // Record the link before anything else can go wrong, so it is
                // counted even if the diagnostic callback panics
                let failure = {
                    let mut lists = results.lock().unwrap_or_else(PoisonError::into_inner);
                    match outcome {
                        Ok(_) => {
                            lists.accessible.push(link);
                            None
                        }
                        Err(failure) => {
                            debug!(url = %link.url, kind = ?failure.kind, "link inaccessible");
                            lists.inaccessible.push(link);
                            Some(failure)
                        }
                    }
                    // The lock is released here, before the callback runs
                };

                if let (Some(failure), Some(logger)) = (failure, &checker.config.logger) {
                    logger(&failure.message);
                }
            });
        }

        // Wait for every task. A task that failed (for example a panicking
        // callback) is logged; its link was already recorded above
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("link probe task failed: {}", e);
            }
        }

        // All tasks are done, so we are the only user of the lists now
        let mut lists = results.lock().unwrap_or_else(PoisonError::into_inner);
        let classified = std::mem::take(&mut *lists);
        debug!(
            total,
            accessible = classified.accessible.len(),
            inaccessible = classified.inaccessible.len(),
            "link classification finished"
        );
        classified
    }
}

/// Classifies links without an existing client.
///
/// Builds the shared no-redirect client, then runs `LinkChecker::classify`.
/// The only error is a client that cannot be built (TLS backend failure).
pub async fn classify_links_concurrently(
    links: Vec<NamedLink>,
    config: LinkCheckerConfig,
) -> Result<Classified, reqwest::Error> {
    let client = crate::fetch::http_client()?;
    Ok(LinkChecker::new(client, config).classify(links).await)
}

// HTTP status codes:
// - 200-299: Success
// - 300-399: Redirect (the target answered, so the link works)
// - 400-599: Client or server error
fn analyze_response(link: &str, status: StatusCode) -> Result<u16, ProbeFailed> {
    if status.is_success() || status.is_redirection() {
        Ok(status.as_u16())
    } else {
        Err(ProbeFailed {
            kind: ProbeFailure::Status(status.as_u16()),
            message: format!("HEAD request for {} returned HTTP {}", link, status.as_u16()),
        })
    }
}

// Turns a reqwest error into a failure kind
//
// reqwest exposes is_*() helpers for the common cases;
// anything else is reported as Other with the error text
fn categorize_error(link: &str, error: reqwest::Error) -> ProbeFailed {
    let kind = if error.is_timeout() {
        ProbeFailure::Timeout
    } else if error.is_connect() {
        ProbeFailure::Connect
    } else if error.is_builder() {
        ProbeFailure::InvalidUrl
    } else {
        ProbeFailure::Other
    };

    ProbeFailed {
        kind,
        message: format!("HEAD request failed for {}: {}", link, error),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why HEAD and not GET?
//    - HEAD returns the same status line and headers as GET, without the body
//    - We only need the status to decide if a link works
//
// 2. What does acquire_owned() give us?
//    - An OwnedSemaphorePermit that holds a clone of the Arc<Semaphore>
//    - It can move into a spawned task ('static), unlike a borrowed permit
//    - Dropping it hands the slot to the next waiting task
//
// 3. Why unwrap_or_else(PoisonError::into_inner) on the mutex?
//    - A Mutex becomes "poisoned" if a thread panics while holding it
//    - Our lists are still consistent in that case (push is all-or-nothing),
//      so we take the guard anyway instead of failing the whole run
//
// 4. Why is the lock released before calling the logger?
//    - The callback is user code; it might be slow or even panic
//    - Holding the lock while it runs would stall every other task
//
// 5. What is std::mem::take?
//    - Swaps the value out and leaves Default::default() in its place
//    - Lets us move the lists out of the mutex without cloning them
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::HEAD, MockServer};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn checker(max_concurrency: usize, timeout: Duration) -> LinkChecker {
        let config = LinkCheckerConfig {
            max_concurrency,
            timeout,
            logger: None,
        };
        LinkChecker::new(crate::fetch::http_client().unwrap(), config)
    }

    async fn status_server() -> MockServer {
        let server = MockServer::start_async().await;
        for (path, code) in [("/ok", 200), ("/moved", 301), ("/gone", 410), ("/broken", 500)] {
            server
                .mock_async(|when, then| {
                    when.method(HEAD).path(path);
                    then.status(code);
                })
                .await;
        }
        server
    }

    #[tokio::test]
    async fn test_probe_status_ranges() {
        let server = status_server().await;
        let checker = checker(4, Duration::from_secs(2));

        assert_eq!(checker.probe(&server.url("/ok")).await.unwrap(), 200);
        assert_eq!(checker.probe(&server.url("/moved")).await.unwrap(), 301);

        let gone = checker.probe(&server.url("/gone")).await.unwrap_err();
        assert_eq!(gone.kind, ProbeFailure::Status(410));
        let broken = checker.probe(&server.url("/broken")).await.unwrap_err();
        assert_eq!(broken.kind, ProbeFailure::Status(500));
        // httpmock answers unmatched requests with 404
        let missing = checker.probe(&server.url("/missing")).await.unwrap_err();
        assert_eq!(missing.kind, ProbeFailure::Status(404));
    }

    #[tokio::test]
    async fn test_probe_transport_failures() {
        let checker = checker(1, Duration::from_secs(2));

        let refused = checker.probe("http://127.0.0.1:1/").await.unwrap_err();
        assert_eq!(refused.kind, ProbeFailure::Connect);

        let malformed = checker.probe("not a url").await.unwrap_err();
        assert_eq!(malformed.kind, ProbeFailure::InvalidUrl);
        assert!(malformed.message.contains("request creation failed"));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/slow");
                then.status(200).delay(Duration::from_secs(3));
            })
            .await;

        let checker = checker(1, Duration::from_millis(200));
        let err = checker.probe(&server.url("/slow")).await.unwrap_err();
        assert_eq!(err.kind, ProbeFailure::Timeout);
    }

    #[tokio::test]
    async fn test_classify_partitions_every_link() {
        let server = status_server().await;
        let links: Vec<NamedLink> = ["/ok", "/moved", "/gone", "/broken", "/missing"]
            .iter()
            .map(|p| NamedLink::new(server.url(*p)))
            .chain([NamedLink::new("http://127.0.0.1:1/"), NamedLink::new("::nope::")])
            .collect();

        let classified = checker(3, Duration::from_secs(2)).classify(links.clone()).await;

        assert_eq!(classified.accessible.len() + classified.inaccessible.len(), links.len());
        assert_eq!(classified.accessible.len(), 2);
        for link in &links {
            let in_ok = classified.accessible.contains(link);
            let in_bad = classified.inaccessible.contains(link);
            assert!(in_ok ^ in_bad, "{} must be in exactly one list", link.url);
        }
    }

    #[tokio::test]
    async fn test_classify_empty_input() {
        let classified = checker(2, Duration::from_secs(1)).classify(Vec::new()).await;
        assert_eq!(classified, Classified::default());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/slow");
                then.status(200).delay(Duration::from_millis(250));
            })
            .await;

        let links: Vec<NamedLink> = (0..4)
            .map(|i| NamedLink::new(format!("{}?n={}", server.url("/slow"), i)))
            .collect();

        let started = Instant::now();
        let classified = checker(1, Duration::from_secs(5)).classify(links).await;

        // One permit means the four probes run back to back
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(classified.accessible.len(), 4);
    }

    #[tokio::test]
    async fn test_logger_receives_each_failure() {
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&failures);
        let config = LinkCheckerConfig {
            max_concurrency: 2,
            timeout: Duration::from_secs(2),
            logger: Some(Arc::new(move |msg: &str| {
                assert!(msg.contains("127.0.0.1:1"));
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        };

        let links = vec![
            NamedLink::new("http://127.0.0.1:1/a"),
            NamedLink::new("http://127.0.0.1:1/b"),
        ];
        let classified = classify_links_concurrently(links, config).await.unwrap();

        assert_eq!(classified.inaccessible.len(), 2);
        assert_eq!(failures.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_logger_keeps_every_link() {
        let config = LinkCheckerConfig {
            max_concurrency: 2,
            timeout: Duration::from_secs(2),
            logger: Some(Arc::new(|_: &str| panic!("logger blew up"))),
        };

        let links = vec![
            NamedLink::new("http://127.0.0.1:1/a"),
            NamedLink::new("http://127.0.0.1:1/b"),
        ];
        let classified = classify_links_concurrently(links, config).await.unwrap();

        // The callback panics inside each task, but both links are still counted
        assert_eq!(classified.inaccessible.len(), 2);
        assert!(classified.accessible.is_empty());
    }
}
