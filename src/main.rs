// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up tracing (diagnostics go to stderr, results to stdout)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = all links reachable, 1 = unreachable links, 2 = error)
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ProbeArgs};
use page_analyzer::checker::Classified;
use page_analyzer::config::{ConfigSource, EmbeddedConfig, FileConfig};
use page_analyzer::extract::{relabel_duplicates, to_named_links};
use page_analyzer::{
    classify_links_concurrently, AnalysisResult, Analyzer, LinkCheckerConfig, NamedLink,
    ResultCache,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// #[tokio::main] turns our async main into a regular main
// that starts the tokio runtime and blocks on it
#[tokio::main]
async fn main() {
    // Run the real logic and map any error to exit code 2
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Parses arguments and runs the chosen subcommand
//
// Returns:
//   Ok(exit code) when the command ran (0 or 1 depending on the links found)
//   Err(e) for invalid input, fetch or render failures, or a bad config
async fn run() -> Result<i32> {
    // Parse command-line arguments
    // If parsing fails (e.g., missing required arg), clap prints help and exits
    let cli = Cli::parse();

    // Set up diagnostics before anything can log
    init_tracing(cli.verbose);

    // Match on the subcommand and dispatch to the appropriate handler
    match cli.command {
        Commands::Analyze {
            url,
            json,
            config,
            render_server,
            label_duplicates,
            probe,
        } => {
            // --config points at a JSON file; otherwise use the built-in heading list
            let source: Arc<dyn ConfigSource> = match config {
                Some(path) => Arc::new(FileConfig::new(path)),
                None => Arc::new(EmbeddedConfig),
            };
            let settings = cli::settings_from(&render_server, &probe);
            handle_analyze(&url, json, label_duplicates, &settings, source).await
        }
        Commands::CheckLinks { links, json, probe } => {
            handle_check_links(links, json, &probe).await
        }
    }
}

// RUST_LOG wins; otherwise --verbose selects debug for our crate
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "page_analyzer=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Handles the 'analyze' subcommand
//
// Parameters:
//   url: the page to analyze, as typed by the user
//   json: print machine-readable JSON instead of the report
//   label_duplicates: show repeated links as "<url> (<n>)"
//   settings: timeouts, concurrency and render server address
//   source: where the heading list comes from
//
// Returns:
//   Ok(1) if any link is inaccessible, Ok(0) otherwise
async fn handle_analyze(
    url: &str,
    json: bool,
    label_duplicates: bool,
    settings: &page_analyzer::config::Settings,
    source: Arc<dyn ConfigSource>,
) -> Result<i32> {
    // A CLI run analyzes one page, but the analyzer always goes through a cache
    let cache = Arc::new(ResultCache::new(settings.cache_ttl));
    let analyzer = Analyzer::new(settings, source, cache)?;

    if !json {
        println!("🔍 Analyzing page: {}", url);
    }
    // This is where the fetch -> extract -> classify pipeline runs
    let mut result = analyzer.analyze_page(url).await?;

    // Relabeling is presentation only, so it happens after the analysis
    if label_duplicates {
        relabel_all(&mut result);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    Ok(exit_code_for(result.inaccessible_links.len()))
}

// Handles the 'check-links' subcommand
//
// Parameters:
//   links: the URLs given on the command line
//   json: print machine-readable JSON instead of the summary
//   probe: concurrency and timeout flags
//
// Returns:
//   Ok(1) if any link is inaccessible, Ok(0) otherwise
async fn handle_check_links(links: Vec<String>, json: bool, probe: &ProbeArgs) -> Result<i32> {
    // Repeated arguments become one link with a higher occurrence count
    let named = to_named_links(&links);

    if !json {
        println!("🌐 Checking {} unique link(s)...\n", named.len());
    }

    let config = LinkCheckerConfig {
        max_concurrency: probe.max_concurrency,
        timeout: probe.link_timeout(),
        logger: Some(Arc::new(|msg: &str| tracing::info!("{}", msg))),
    };
    // Every probe failure is reported through tracing as it happens
    let classified = classify_links_concurrently(named, config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&classified)?);
    } else {
        print_classified(&classified);
    }

    Ok(exit_code_for(classified.inaccessible.len()))
}

// Relabels every link list of a result
//
// The accessibility lists hold the same links as the internal/external
// lists, so all four are relabeled to keep one label per URL in the report
fn relabel_all(result: &mut AnalysisResult) {
    result.internal_links = relabel_duplicates(&result.internal_links);
    result.external_links = relabel_duplicates(&result.external_links);
    result.accessible_links = relabel_duplicates(&result.accessible_links);
    result.inaccessible_links = relabel_duplicates(&result.inaccessible_links);
}

// Exit code convention:
// 0 = everything reachable, 1 = at least one inaccessible link
// (2 = error, handled in main)
fn exit_code_for(inaccessible: usize) -> i32 {
    if inaccessible > 0 {
        1
    } else {
        0
    }
}

// Prints the human-readable report for one analyzed page
fn print_report(result: &AnalysisResult) {
    let title = if result.title.is_empty() {
        "(none)"
    } else {
        result.title.as_str()
    };

    println!();
    println!("{:<16} {}", "Title:", title);
    println!("{:<16} {}", "HTML version:", result.html_version);
    println!("{:<16} {}", "Login form:", if result.has_login_form { "yes" } else { "no" });
    println!("{:<16} {:.2} seconds", "Analysis time:", result.analysis_duration.as_secs_f64());

    // Per-level counts first, then every heading in document order
    println!("\n📑 Headings ({}):", result.headings.len());
    for (tag, count) in result.heading_counts() {
        println!("   {:<8} {}", tag.to_uppercase(), count);
    }
    for heading in &result.headings {
        println!("   <{}> {}", heading.tag, heading.text);
    }

    print_links("🏠 Internal links", &result.internal_links);
    print_links("🌍 External links", &result.external_links);

    // Reuse the check-links summary for the accessibility part
    println!();
    print_classified(&Classified {
        accessible: result.accessible_links.clone(),
        inaccessible: result.inaccessible_links.clone(),
    });
}

// Prints one link list with unique and total counts
fn print_links(heading: &str, links: &[NamedLink]) {
    let total: usize = links.iter().map(|l| l.occurrence).sum();
    println!("\n{} ({} unique, {} total):", heading, links.len(), total);
    for link in links {
        println!("   {}", link.label);
    }
}

// Prints the inaccessible links followed by a summary
fn print_classified(classified: &Classified) {
    // Only failures are listed; accessible links are just counted
    for link in &classified.inaccessible {
        println!("   ❌ {}", truncate(&link.label, 100));
    }

    let total = classified.accessible.len() + classified.inaccessible.len();
    println!("\n📊 Summary:");
    println!("   ✅ Accessible: {}", classified.accessible.len());
    println!("   ❌ Inaccessible: {}", classified.inaccessible.len());
    println!("   📋 Total: {}", total);
}

// Truncate long URLs for display, respecting char boundaries
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
