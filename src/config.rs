use crate::error::DiscussionResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default language tag for both recognition and synthesis
pub const DEFAULT_LANGUAGE: &str = "en-GB";

/// Default number of recognition alternatives requested per result
pub const DEFAULT_MAX_ALTERNATIVES: u32 = 10;

/// Default delay before listening again after a synthesize call
pub const DEFAULT_RESUME_DELAY_MS: u64 = 500;

/// Session configuration for a discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscussionConfig {
    // Speech
    pub recognition_language: String,
    pub synthesis_language: String,
    pub recognition_max_alternatives: u32,

    // Turn taking
    pub resume_delay_ms: u64,
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            recognition_language: DEFAULT_LANGUAGE.to_string(),
            synthesis_language: DEFAULT_LANGUAGE.to_string(),
            recognition_max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            resume_delay_ms: DEFAULT_RESUME_DELAY_MS,
        }
    }
}

impl DiscussionConfig {
    /// Load config from the default location, or fall back to defaults
    pub fn load() -> DiscussionResult<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path
    ///
    /// A missing file yields defaults. A file that does not parse is moved
    /// aside to `<name>.json.corrupt` and defaults are used instead.
    pub fn load_from(path: &Path) -> DiscussionResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> DiscussionResult<()> {
        self.save_to(&config_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> DiscussionResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("discussion")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscussionError;

    #[test]
    fn test_default_config() {
        let config = DiscussionConfig::default();
        assert_eq!(config.recognition_language, "en-GB");
        assert_eq!(config.synthesis_language, "en-GB");
        assert_eq!(config.recognition_max_alternatives, 10);
        assert_eq!(config.resume_delay_ms, 500);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: DiscussionConfig =
            serde_json::from_str(r#"{"synthesis_language":"de-DE"}"#).expect("parse");
        assert_eq!(config.synthesis_language, "de-DE");
        assert_eq!(config.recognition_language, "en-GB");
        assert_eq!(config.recognition_max_alternatives, 10);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/config.json");

        let config = DiscussionConfig {
            recognition_language: "fr-FR".to_string(),
            resume_delay_ms: 0,
            ..Default::default()
        };
        config.save_to(&path).expect("save");

        let restored = DiscussionConfig::load_from(&path).expect("load");
        assert_eq!(restored, config);
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DiscussionConfig::load_from(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, DiscussionConfig::default());
    }

    #[test]
    fn test_corrupt_config_is_moved_aside() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not valid json").expect("write");

        let config = DiscussionConfig::load_from(&path).expect("load");
        assert_eq!(config, DiscussionConfig::default());
        assert!(!path.exists());
        assert!(dir.path().join("config.json.corrupt").exists());
    }

    #[test]
    fn test_unreadable_config_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = DiscussionConfig::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, DiscussionError::Io(_)));
    }

    #[test]
    fn test_save_into_file_parent_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").expect("write");

        let err = DiscussionConfig::default()
            .save_to(&blocker.join("config.json"))
            .unwrap_err();
        assert!(matches!(err, DiscussionError::Io(_)));
    }
}
