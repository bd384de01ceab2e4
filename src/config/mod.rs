// src/config/mod.rs
// =============================================================================
// Configuration consumed by the analyzer.
//
// Submodules:
// - tags: which element names count as headings, and where that list is loaded from
// - settings: timeouts, concurrency and the render server address
//
// Rust concepts:
// - Traits: ConfigSource lets tests swap in an in-memory config
// - include_str!: the default config is compiled into the binary
// =============================================================================

mod settings;
mod tags;

// Re-export public items so callers write `config::Settings`
pub use settings::{Settings, DEFAULT_RENDER_SERVER_URL};
pub use tags::{ConfigSource, EmbeddedConfig, FileConfig, StaticConfig, TagConfig};
