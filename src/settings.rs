//! Application settings storage
//!
//! Stores dataset paths and extraction defaults in a JSON file in the app
//! data directory. Environment variables override the stored paths.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Global settings instance
static SETTINGS: RwLock<Option<Settings>> = RwLock::new(None);

/// Path to config file (set during init)
static CONFIG_PATH: RwLock<Option<PathBuf>> = RwLock::new(None);

pub const ENV_PAPERS_DIR: &str = "PATH_PAPERS";
pub const ENV_DATASET: &str = "PATH_DATASET";
pub const ENV_VOCABULARY: &str = "PATH_VOCABULARY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Root of the downloaded PDF tree ({year}/{venue}/{id}.pdf)
    #[serde(default)]
    pub papers_dir: Option<String>,
    /// SQLite dataset path
    #[serde(default)]
    pub db_path: Option<String>,
    /// Word list used for dehyphenation and lemmatization
    #[serde(default)]
    pub vocabulary_path: Option<String>,
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

fn default_checkpoint_interval() -> usize {
    1000
}

fn default_min_year() -> i32 {
    1965
}

fn default_max_year() -> i32 {
    2020
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            papers_dir: None,
            db_path: None,
            vocabulary_path: None,
            extra_stopwords: Vec::new(),
            checkpoint_interval: default_checkpoint_interval(),
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

impl Settings {
    /// Load settings from disk or create default
    fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!("[Settings] Ignoring unreadable {}: {}", path.display(), e);
                    Settings::default()
                }),
                Err(_) => Settings::default(),
            }
        } else {
            Settings::default()
        }
    }

    /// Save settings to disk
    fn save(&self, path: &Path) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, content)
            .map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }
}

/// Default app data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("nlpland"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Initialize settings with the app data directory
pub fn init(app_data_dir: PathBuf) {
    let config_path = app_data_dir.join("settings.json");
    let settings = Settings::load(&config_path);

    if let Ok(mut guard) = CONFIG_PATH.write() {
        *guard = Some(config_path);
    }
    if let Ok(mut guard) = SETTINGS.write() {
        *guard = Some(settings);
    }
}

/// Current settings (defaults if not initialized)
pub fn get() -> Settings {
    SETTINGS
        .read()
        .ok()
        .and_then(|guard| guard.clone())
        .unwrap_or_default()
}

/// Apply a change and save it
pub fn update(change: impl FnOnce(&mut Settings)) -> Result<(), String> {
    let mut settings_guard = SETTINGS.write()
        .map_err(|_| "Failed to acquire settings lock")?;

    let settings = settings_guard.get_or_insert_with(Settings::default);
    change(settings);

    // Save to disk
    let config_path = CONFIG_PATH.read()
        .map_err(|_| "Failed to acquire config path lock")?
        .clone()
        .ok_or("Settings not initialized")?;

    settings.save(&config_path)
}

/// Environment variable takes precedence, then the stored setting
fn env_or(var: &str, stored: Option<String>) -> Option<String> {
    if let Ok(value) = std::env::var(var) {
        if !value.is_empty() {
            return Some(value);
        }
    }
    stored
}

pub fn get_papers_dir() -> Option<PathBuf> {
    env_or(ENV_PAPERS_DIR, get().papers_dir).map(PathBuf::from)
}

pub fn get_db_path() -> PathBuf {
    env_or(ENV_DATASET, get().db_path)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_data_dir().join("nlpland.db"))
}

pub fn get_vocabulary_path() -> Option<PathBuf> {
    env_or(ENV_VOCABULARY, get().vocabulary_path).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"papers_dir": "/pdfs"}"#).unwrap();
        assert_eq!(settings.papers_dir.as_deref(), Some("/pdfs"));
        assert_eq!(settings.checkpoint_interval, 1000);
        assert_eq!(settings.min_year, 1965);
        assert_eq!(settings.max_year, 2020);
        assert!(settings.extra_stopwords.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings { checkpoint_interval: 250, ..Settings::default() };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_env_or_prefers_env() {
        std::env::set_var("NLPLAND_TEST_ENV_OR", "/from/env");
        assert_eq!(env_or("NLPLAND_TEST_ENV_OR", Some("stored".into())).as_deref(), Some("/from/env"));
        std::env::remove_var("NLPLAND_TEST_ENV_OR");
        assert_eq!(env_or("NLPLAND_TEST_ENV_OR", Some("stored".into())).as_deref(), Some("stored"));
    }
}
