// src/fetch/pipeline.rs
// =============================================================================
// The fetch pipeline: primary GET, bot-block detection, render fallback.
//
// How it works:
// 1. Validate the URL (absolute http/https with a host)
// 2. GET it without following redirects
// 3. A 3xx response, or a body containing a known challenge marker, means the
//    origin is blocking automated clients
// 4. When blocked, ask the render service for the DOM instead
//
// Detection is a plain substring scan. Parsing a challenge page would be
// wasted work, so nothing is parsed before the decision is made.
// =============================================================================

use super::render::RenderClient;
use super::version::detect_html_version;
use crate::config::Settings;
use crate::error::AnalyzeError;
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

// Substrings that identify a challenge page instead of real content:
// - "captcha": reCAPTCHA, hCaptcha and most home-grown bot checks
// - "window._cf_chl_opt": the Cloudflare challenge script
// Lower-case markers; the body is lower-cased before scanning
const BOT_BLOCK_MARKERS: &[&str] = &["captcha", "window._cf_chl_opt"];

/// Bytes of the authoritative document plus what we learned fetching it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: Vec<u8>,
    pub html_version: String,
    /// True when the body came from the render service
    pub rendered: bool,
}

/// Outcome of the primary GET, before any fallback.
///
/// `body` is empty when the block was detected from a redirect.
#[derive(Debug)]
struct StandardFetch {
    body: Vec<u8>,
    bot_blocked: bool,
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
    render: RenderClient,
}

impl PageFetcher {
    /// Creates a fetcher on top of an existing client.
    ///
    /// The client is cloned into the render client too
    /// (reqwest clients are reference-counted, so this shares one pool).
    pub fn new(client: Client, settings: &Settings) -> Self {
        let render = RenderClient::new(
            client.clone(),
            &settings.render_server_url,
            settings.render_timeout,
        );
        Self {
            client,
            timeout: settings.fetch_timeout,
            render,
        }
    }

    /// Retrieves the authoritative document for a URL.
    ///
    /// Parameters:
    ///   url: the page address as given by the caller
    ///
    /// Returns:
    ///   Ok(FetchedPage) with the direct or rendered body and its HTML version
    ///   Err(InvalidInput) before any network I/O for a malformed URL
    ///   Err(FetchFailed) when the primary GET fails
    ///   Err(RenderFailed) when the fallback fails (there is no third attempt)
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, AnalyzeError> {
        // Step 1: reject anything that is not an absolute http(s) URL
        let parsed = validate_url(url)?;

        // Step 2: the direct request
        let standard = self.try_standard_fetch(&parsed).await?;

        // Step 3: if the origin blocked us, the rendered DOM replaces the body
        // A render failure is returned as-is
        let (body, rendered) = if standard.bot_blocked {
            info!(url, "bot-block detected, falling back to render service");
            (self.render.render(url).await?, true)
        } else {
            (standard.body, false)
        };

        // Step 4: classify the DOCTYPE of whichever body we ended up with
        let html_version = detect_html_version(&body);
        debug!(url, bytes = body.len(), rendered, %html_version, "page fetched");

        Ok(FetchedPage {
            url: parsed,
            body,
            html_version,
            rendered,
        })
    }

    // The primary GET
    //
    // Returns:
    //   Ok(StandardFetch) for 2xx (body scanned for markers) and 3xx (blocked)
    //   Err(FetchFailed) for transport errors, other statuses and body read errors
    async fn try_standard_fetch(&self, url: &Url) -> Result<StandardFetch, AnalyzeError> {
        // The client never follows redirects, so a 3xx arrives here untouched
        // No status yet: the request never got an answer (DNS, refused, timeout)
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AnalyzeError::FetchFailed {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_redirection() {
            // Likely a redirect to a bot check or login wall
            debug!(url = %url, status = status.as_u16(), "redirect treated as bot-block");
            return Ok(StandardFetch {
                body: Vec::new(),
                bot_blocked: true,
            });
        }
        // 4xx and 5xx: the origin answered, but not with a page
        if !status.is_success() {
            return Err(AnalyzeError::FetchFailed {
                status: Some(status.as_u16()),
                message: format!("HTTP error: {}", status),
            });
        }

        // The status line was fine but the body can still fail to arrive
        // (connection dropped mid-body, timeout while streaming)
        let body = response
            .bytes()
            .await
            .map_err(|e| AnalyzeError::FetchFailed {
                status: Some(status.as_u16()),
                message: format!("failed to read response body: {}", e),
            })?
            .to_vec();

        // A 200 that is really a challenge page still counts as blocked
        let bot_blocked = contains_bot_block_marker(&body);
        Ok(StandardFetch { body, bot_blocked })
    }
}

/// Shared HTTP client for page fetches and link probes.
///
/// Redirects are a bot-block signal for the page fetch and already count as
/// accessible for a probe, so they are never followed.
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder().redirect(redirect::Policy::none()).build()
}

/// Accepts only absolute http(s) URLs that name a host.
pub fn validate_url(url: &str) -> Result<Url, AnalyzeError> {
    // Url::parse already rejects relative references like "/path"
    let parsed = Url::parse(url.trim())
        .map_err(|e| AnalyzeError::InvalidInput(format!("'{}': {}", url, e)))?;

    // mailto:, ftp:, file: and friends parse fine but cannot be fetched
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AnalyzeError::InvalidInput(format!(
            "'{}': unsupported scheme '{}'",
            url,
            parsed.scheme()
        )));
    }
    // "http:///path" parses too, but there is nothing to connect to
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(AnalyzeError::InvalidInput(format!("'{}': missing host", url)));
    }
    Ok(parsed)
}

// Plain substring scan over the whole body
// from_utf8_lossy keeps going on invalid bytes instead of failing
fn contains_bot_block_marker(body: &[u8]) -> bool {
    let lowered = String::from_utf8_lossy(body).to_lowercase();
    BOT_BLOCK_MARKERS.iter().any(|marker| lowered.contains(marker))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Policy::none() for redirects?
//    - By default reqwest follows up to 10 redirects silently
//    - Sites often bounce bots to a challenge page with a 302,
//      so we need to see the redirect itself to detect the block
//
// 2. What does map_err do?
//    - Converts the error inside a Result into another type
//    - Here every reqwest::Error becomes an AnalyzeError with context
//    - `?` then returns it early from the function
//
// 3. Why Vec<u8> and not String for the body?
//    - Pages are not always valid UTF-8
//    - Bytes are kept as-is; each consumer decides how to decode them
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, Method::POST, MockServer};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn settings_for(render: &MockServer) -> Settings {
        Settings {
            render_server_url: render.base_url(),
            fetch_timeout: Duration::from_secs(2),
            render_timeout: Duration::from_secs(2),
            ..Settings::default()
        }
    }

    fn fetcher_for(render: &MockServer) -> PageFetcher {
        PageFetcher::new(http_client().unwrap(), &settings_for(render))
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/page").is_ok());
        assert!(matches!(validate_url("://bad-url"), Err(AnalyzeError::InvalidInput(_))));
        assert!(matches!(validate_url("/relative/path"), Err(AnalyzeError::InvalidInput(_))));
        assert!(matches!(
            validate_url("mailto:me@example.com"),
            Err(AnalyzeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_marker_scan_is_case_insensitive() {
        assert!(contains_bot_block_marker(b"<div class=\"g-reCAPTCHA\"></div>"));
        assert!(contains_bot_block_marker(b"<script>window._cf_chl_opt = {}</script>"));
        assert!(!contains_bot_block_marker(b"<html><body>hello</body></html>"));
    }

    #[tokio::test]
    async fn test_plain_page_skips_render() {
        let origin = MockServer::start_async().await;
        let render = MockServer::start_async().await;
        origin
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body("<!DOCTYPE html><title>Plain</title>");
            })
            .await;
        let render_mock = render
            .mock_async(|when, then| {
                when.method(POST).path("/render");
                then.status(200).body("rendered");
            })
            .await;

        let fetcher = fetcher_for(&render);
        let page = fetcher.fetch(&origin.url("/")).await.unwrap();

        assert!(!page.rendered);
        assert_eq!(page.html_version, "HTML5");
        assert_eq!(page.body, b"<!DOCTYPE html><title>Plain</title>");
        render_mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_captcha_body_uses_rendered_dom() {
        let origin = MockServer::start_async().await;
        let render = MockServer::start_async().await;
        origin
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body("<html>Please solve this CAPTCHA</html>");
            })
            .await;
        let render_mock = render
            .mock_async(|when, then| {
                when.method(POST).path("/render");
                then.status(200).body("<!DOCTYPE html><title>Real</title>");
            })
            .await;

        let fetcher = fetcher_for(&render);
        let page = fetcher.fetch(&origin.url("/")).await.unwrap();

        assert!(page.rendered);
        assert_eq!(page.body, b"<!DOCTYPE html><title>Real</title>");
        render_mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed_and_triggers_render() {
        let origin = MockServer::start_async().await;
        let render = MockServer::start_async().await;
        let target = origin
            .mock_async(|when, then| {
                when.method(GET).path("/challenge");
                then.status(200).body("challenge page");
            })
            .await;
        origin
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(302).header("Location", "/challenge");
            })
            .await;
        let render_mock = render
            .mock_async(|when, then| {
                when.method(POST).path("/render");
                then.status(200).body("<html><title>Rendered</title></html>");
            })
            .await;

        let fetcher = fetcher_for(&render);
        let page = fetcher.fetch(&origin.url("/")).await.unwrap();

        assert!(page.rendered);
        render_mock.assert_calls_async(1).await;
        target.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_failure() {
        let origin = MockServer::start_async().await;
        let render = MockServer::start_async().await;
        origin
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(403).body("Forbidden");
            })
            .await;

        let fetcher = fetcher_for(&render);
        let err = fetcher.fetch(&origin.url("/")).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::FetchFailed { status: Some(403), .. }));
        assert!(err.to_string().contains("HTTP error"));
    }

    #[tokio::test]
    async fn test_render_failure_is_terminal() {
        let origin = MockServer::start_async().await;
        let render = MockServer::start_async().await;
        origin
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(301).header("Location", "https://elsewhere.invalid/");
            })
            .await;
        render
            .mock_async(|when, then| {
                when.method(POST).path("/render");
                then.status(503);
            })
            .await;

        let fetcher = fetcher_for(&render);
        let err = fetcher.fetch(&origin.url("/")).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::RenderFailed { status: Some(503), .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_failure() {
        let render = MockServer::start_async().await;
        let fetcher = fetcher_for(&render);
        let err = fetcher.fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, AnalyzeError::FetchFailed { status: None, .. }));
    }

    #[tokio::test]
    async fn test_truncated_body_is_fetch_failure() {
        // A server that promises 100 bytes, sends 5, then hangs up
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
                .await;
            let _ = socket.shutdown().await;
        });

        let render = MockServer::start_async().await;
        let fetcher = fetcher_for(&render);
        let err = fetcher.fetch(&format!("http://{}/", addr)).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::FetchFailed { status: Some(200), .. }));
        assert!(err.to_string().contains("failed to read response body"));
    }
}
