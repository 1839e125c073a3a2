use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::gemini::DEFAULT_BASE_URL;
use crate::logging;
use crate::media;
use crate::options::Language;
use crate::orchestrator::PollPolicy;

/// Environment variables checked for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_language: Option<String>,
    pub fast_mode: bool,
    pub video_poll_interval_secs: u64,
    pub video_max_polls: u32,
    pub media_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    /// `EnvFilter` directives used when `PINAI_LOG` is unset
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_language: None,
            fast_mode: false,
            video_poll_interval_secs: 5,
            video_max_polls: 120,
            media_dir: None,
            log_dir: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Remember the language picked in the UI for the next launch. A file
    /// that no longer parses is left alone and reported.
    pub fn save_default_language(path: &Path, language: Language) -> Result<()> {
        let mut config = Self::load_from(path)?;
        config.default_language = Some(language.as_str().to_string());
        config.save_to(path)
    }

    /// The environment wins over the file.
    pub fn resolve_api_key(&self) -> Option<String> {
        Self::env_api_key().or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }

    fn env_api_key() -> Option<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|k| !k.trim().is_empty())
    }

    /// Unknown names fall back to English.
    pub fn language(&self) -> Language {
        self.default_language
            .as_deref()
            .and_then(Language::from_str)
            .unwrap_or_default()
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.video_poll_interval_secs.max(1)),
            max_polls: self.video_max_polls.max(1),
        }
    }

    pub fn media_dir(&self) -> PathBuf {
        self.media_dir.clone().unwrap_or_else(media::default_media_dir)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(logging::default_log_dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;

        Ok(config_dir.join("pinai").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.language(), Language::English);
        assert_eq!(config.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"fast_mode": true, "default_language": "telugu"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.fast_mode);
        assert_eq!(config.language(), Language::Telugu);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.video_max_polls, 120);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn test_save_default_language_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        Config::save_default_language(&path, Language::Kannada).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.language(), Language::Kannada);
    }

    #[test]
    fn test_save_default_language_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"fast_mode": true, "api_key": "k"}"#).unwrap();

        Config::save_default_language(&path, Language::Hindi).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(config.fast_mode);
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.language(), Language::Hindi);
    }

    #[test]
    fn test_save_default_language_leaves_malformed_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_key": "k", oops"#).unwrap();

        let err = Config::save_default_language(&path, Language::Tamil).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"api_key": "k", oops"#);
    }

    #[test]
    fn test_log_dir_override() {
        let config = Config {
            log_dir: Some(PathBuf::from("/tmp/pinai-logs")),
            ..Config::default()
        };
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/pinai-logs"));
        assert_eq!(Config::default().log_dir(), logging::default_log_dir());
    }

    #[test]
    fn test_zero_poll_values_are_clamped() {
        let config = Config {
            video_poll_interval_secs: 0,
            video_max_polls: 0,
            ..Config::default()
        };
        let policy = config.poll_policy();
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.max_polls, 1);
    }
}
