// src/config/settings.rs
// =============================================================================
// Process-level tunables: timeouts, concurrency and the render server address.
//
// Defaults match what the analysis pipeline is designed around; the CLI
// overrides individual fields from flags and environment variables.
// =============================================================================

use std::time::Duration;

// Default values, also used as the CLI flag defaults
pub const DEFAULT_RENDER_SERVER_URL: &str = "http://localhost:3001";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(30);
pub const LINK_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
pub const LINK_CHECK_CONCURRENCY: usize = 10;
pub const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Everything the analyzer needs besides the heading config.
///
/// Build it with `Settings::default()` and override what you need using
/// struct update syntax (`Settings { max_concurrency: 4, ..Settings::default() }`).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the headless render service; `/render` is appended.
    pub render_server_url: String,
    /// Timeout for the primary GET
    pub fetch_timeout: Duration,
    /// Timeout for the render call (rendering a page in a browser is slow)
    pub render_timeout: Duration,
    /// Upper bound on simultaneous link probes
    pub max_concurrency: usize,
    /// Timeout for each link probe
    pub link_timeout: Duration,
    /// How long a cached analysis stays fresh
    pub cache_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_server_url: DEFAULT_RENDER_SERVER_URL.to_string(),
            fetch_timeout: FETCH_TIMEOUT,
            render_timeout: RENDER_TIMEOUT,
            max_concurrency: LINK_CHECK_CONCURRENCY,
            link_timeout: LINK_CHECK_TIMEOUT,
            cache_ttl: CACHE_TTL,
        }
    }
}
