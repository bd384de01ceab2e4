// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - analyze: full page analysis (structure + link accessibility)
// - check-links: accessibility check for links you already have
//
// Rust concepts:
// - Derive macros: clap generates the parser from these structs
// - #[command(flatten)]: shares one group of flags between subcommands
// =============================================================================

use clap::{Args, Parser, Subcommand};
use page_analyzer::config::{Settings, DEFAULT_RENDER_SERVER_URL};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "page-analyzer",
    version = "0.1.0",
    about = "Analyze a web page's structure and check which of its links are reachable",
    long_about = "page-analyzer fetches a page (falling back to a headless render service when \
                  the site blocks bots), reports its title, HTML version, headings, links and \
                  login-form presence, and probes every link for accessibility."
)]
pub struct Cli {
    /// Print debug diagnostics to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a page: title, version, headings, links, login form, reachability
    ///
    /// Example: page-analyzer analyze https://example.com --json
    Analyze {
        /// Page URL (absolute http or https)
        url: String,

        /// Output results in JSON format instead of a report
        #[arg(long)]
        json: bool,

        /// JSON file with a "headings" array; defaults to the built-in config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Base URL of the headless render service used for bot-blocked pages
        #[arg(long, env = "RENDER_SERVER_URL", default_value = DEFAULT_RENDER_SERVER_URL)]
        render_server: String,

        /// Show repeated links as "<url> (<count>)"
        #[arg(long)]
        label_duplicates: bool,

        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// Check whether the given links are reachable
    ///
    /// Example: page-analyzer check-links https://example.com https://example.org
    CheckLinks {
        /// One or more absolute URLs
        #[arg(required = true)]
        links: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        probe: ProbeArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Maximum number of links probed at the same time
    #[arg(long, default_value_t = 10)]
    pub max_concurrency: usize,

    /// Per-link probe timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub link_timeout: u64,
}

impl ProbeArgs {
    pub fn link_timeout(&self) -> Duration {
        Duration::from_secs(self.link_timeout)
    }
}

/// Builds `Settings` from the analyze flags, keeping defaults for the rest.
pub fn settings_from(render_server: &str, probe: &ProbeArgs) -> Settings {
    Settings {
        render_server_url: render_server.to_string(),
        max_concurrency: probe.max_concurrency,
        link_timeout: probe.link_timeout(),
        ..Settings::default()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[arg(env = "...")] do?
//    - If the flag is not given, clap reads the environment variable
//    - If neither is set, default_value is used
//    - Order of precedence: flag, then env var, then default
//
// 2. What is #[command(flatten)]?
//    - Inlines the fields of another Args struct into this command
//    - Both subcommands get --max-concurrency and --link-timeout
//      without repeating the definitions
//
// 3. Why Option<PathBuf> for --config?
//    - None means "not given", which selects the built-in config
//    - PathBuf is the owned path type, like String is for text
// -----------------------------------------------------------------------------
