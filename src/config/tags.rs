// src/config/tags.rs
// =============================================================================
// Heading-tag configuration.
//
// The extractor treats any element whose tag name appears in `headings` as a
// heading. Where the list comes from is abstracted behind `ConfigSource`:
// - EmbeddedConfig: config/config.json compiled into the binary
// - FileConfig: a JSON file on disk, read on every load
// - StaticConfig: an in-memory list
//
// Each extraction calls `load()` exactly once, so one analysis always sees
// one consistent snapshot even if the file changes underneath it.
// =============================================================================

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// include_str! reads the file at compile time and stores it in the binary
// The path is relative to this source file
const EMBEDDED_CONFIG: &str = include_str!("../../config/config.json");

/// Tag names treated as headings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    #[serde(default)]
    pub headings: Vec<String>,
    /// Carried for compatibility with existing config files; not used by extraction.
    #[serde(default, rename = "allowedTags")]
    pub allowed_tags: Vec<String>,
}

impl TagConfig {
    /// Builds a config from any list of tag names (`&str`, `String`, ...).
    pub fn with_headings<I, S>(headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headings: headings.into_iter().map(Into::into).collect(),
            allowed_tags: Vec::new(),
        }
    }

    /// Membership is order-insensitive and ignores ASCII case, since the
    /// HTML parser lower-cases element names.
    pub fn is_heading(&self, tag: &str) -> bool {
        self.headings.iter().any(|h| h.eq_ignore_ascii_case(tag))
    }

    /// Decodes the config file format. A missing "headings" key means
    /// no headings, not an error.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        // `?` converts serde_json::Error into ConfigError::Decode via #[from]
        Ok(serde_json::from_str(data)?)
    }
}

/// Capability that yields the current heading configuration.
///
/// Send + Sync so one source can be shared by every analysis through an Arc.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<TagConfig, ConfigError>;
}

/// The configuration shipped inside the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedConfig;

impl ConfigSource for EmbeddedConfig {
    fn load(&self) -> Result<TagConfig, ConfigError> {
        TagConfig::from_json(EMBEDDED_CONFIG)
    }
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for FileConfig {
    fn load(&self) -> Result<TagConfig, ConfigError> {
        // Keep the path in the error so the message says which file failed
        let data = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        TagConfig::from_json(&data)
    }
}

/// A fixed, already-loaded configuration.
#[derive(Debug, Clone)]
pub struct StaticConfig(pub TagConfig);

impl ConfigSource for StaticConfig {
    fn load(&self) -> Result<TagConfig, ConfigError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_config_has_standard_headings() {
        let cfg = EmbeddedConfig.load().unwrap();
        for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
            assert!(cfg.is_heading(tag), "missing {}", tag);
        }
        assert!(!cfg.allowed_tags.is_empty());
    }

    #[test]
    fn test_allowed_tags_optional() {
        let cfg = TagConfig::from_json(r#"{"headings": ["custom-heading"]}"#).unwrap();
        assert_eq!(cfg.headings, vec!["custom-heading"]);
        assert!(cfg.allowed_tags.is_empty());
    }

    #[test]
    fn test_is_heading_ignores_case_and_order() {
        let cfg = TagConfig::with_headings(["H2", "h1"]);
        assert!(cfg.is_heading("h1"));
        assert!(cfg.is_heading("h2"));
        assert!(!cfg.is_heading("h3"));
    }

    #[test]
    fn test_file_config_reads_from_disk() {
        let name = format!("page-analyzer-tags-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"headings": ["h1", "legend"]}}"#).unwrap();
        drop(file);

        let cfg = FileConfig::new(&path).load().unwrap();
        assert!(cfg.is_heading("legend"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_config_missing_file() {
        let err = FileConfig::new("/definitely/not/here.json").load().unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let err = TagConfig::from_json("{ headings: ").unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
    }
}
