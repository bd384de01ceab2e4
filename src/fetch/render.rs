// src/fetch/render.rs
// =============================================================================
// Client for the external headless render service.
//
// Protocol: POST {base}/render with JSON body {"url": "<page url>"}.
// A 200 response carries the rendered document as its body; any other status
// is a hard failure. There is no fallback behind this one.
//
// Rust concepts:
// - Lifetimes: RenderRequest<'a> borrows the URL for as long as it lives
// - .json(&body): reqwest serializes with serde and sets Content-Type
// =============================================================================

use crate::error::AnalyzeError;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

// The JSON body sent to the render service: {"url": "..."}
// Borrowing the URL avoids copying it just to serialize it
#[derive(Serialize)]
struct RenderRequest<'a> {
    url: &'a str,
}

/// Talks to the render service at one fixed endpoint.
#[derive(Debug, Clone)]
pub struct RenderClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl RenderClient {
    pub fn new(client: Client, base_url: &str, timeout: Duration) -> Self {
        // Strip trailing slashes so "http://host/" and "http://host" agree
        Self {
            client,
            endpoint: format!("{}/render", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    /// Asks the service to load `url` in a browser and return its DOM.
    ///
    /// Returns:
    ///   Ok(bytes) of the rendered document on HTTP 200
    ///   Err(RenderFailed) with the status for any other answer,
    ///   or without one when the service could not be reached
    pub async fn render(&self, url: &str) -> Result<Vec<u8>, AnalyzeError> {
        debug!(url, endpoint = %self.endpoint, "requesting rendered DOM");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&RenderRequest { url })
            .send()
            .await
            .map_err(|e| AnalyzeError::RenderFailed {
                status: None,
                message: format!("failed to call render server: {}", e),
            })?;

        // Only 200 is a success here; even other 2xx codes are rejected
        let status = response.status();
        if status != StatusCode::OK {
            // Body is diagnostic only; an unreadable body is not worth a second error
            let body = response.text().await.unwrap_or_default();
            warn!(url, status = status.as_u16(), "render server rejected request");
            return Err(AnalyzeError::RenderFailed {
                status: Some(status.as_u16()),
                message: format!(
                    "render server returned {}: {}",
                    status.as_u16(),
                    body.trim()
                ),
            });
        }

        // The rendered DOM is used as-is, whatever its encoding
        let bytes = response.bytes().await.map_err(|e| AnalyzeError::RenderFailed {
            status: Some(status.as_u16()),
            message: format!("failed to read rendered body: {}", e),
        })?;
        Ok(bytes.to_vec())
    }
}
