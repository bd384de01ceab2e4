// src/error.rs
// =============================================================================
// Error types for the analysis pipeline.
//
// Every terminal failure of `Analyzer::analyze_page` is one of the variants
// below. Per-link probe failures are NOT errors: they are recovered inside the
// checker and reported as inaccessible links.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Terminal failures of a page analysis.
///
/// #[derive(Error)] from thiserror writes the Display impl from the
/// #[error(...)] attributes, and #[from] adds a From conversion so `?`
/// can turn a ConfigError into ConfigUnavailable.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The requested URL is not an absolute http(s) URL.
    #[error("invalid URL: {0}")]
    InvalidInput(String),

    /// The primary GET failed at the transport level or returned an error status.
    #[error("failed to fetch: {message}")]
    FetchFailed {
        status: Option<u16>,
        message: String,
    },

    /// The render fallback was needed and did not produce a document.
    #[error("render fallback failed: {message}")]
    RenderFailed {
        status: Option<u16>,
        message: String,
    },

    /// Heading tags could not be loaded, so extraction cannot be trusted.
    #[error("heading configuration unavailable: {0}")]
    ConfigUnavailable(#[from] ConfigError),
}

impl AnalyzeError {
    /// HTTP-style status a front end should answer with for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            // The caller sent something we refuse to fetch
            AnalyzeError::InvalidInput(_) => 400,
            // Propagate the origin's own error status when there was one
            AnalyzeError::FetchFailed { status: Some(code), .. } if *code >= 400 => *code,
            // No status, or a good status whose body never arrived
            AnalyzeError::FetchFailed { .. } => 502,
            // Our upstream (the render service) let us down
            AnalyzeError::RenderFailed { .. } => 502,
            // Our own setup is broken
            AnalyzeError::ConfigUnavailable(_) => 500,
        }
    }
}

/// Why the heading-tag configuration could not be produced.
///
/// Kept separate from AnalyzeError so config sources do not need to know
/// about fetching or rendering.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode config JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
