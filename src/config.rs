use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::api::DEFAULT_TIMEOUT_SECS;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    pub project_name: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: "ASU Chatbot".to_string(),
            api_base_url: "http://localhost:8000".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Loads the config file if present, otherwise falls back to defaults.
    /// `API_BASE_URL` and `CHAT_TIMEOUT_SECS` environment variables override
    /// whatever the file says.
    pub fn load() -> Result<Self> {
        let mut settings = match Self::config_path() {
            Ok(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("API_BASE_URL") {
            if !url.is_empty() {
                self.api_base_url = url;
            }
        }
        if let Ok(value) = std::env::var("CHAT_TIMEOUT_SECS") {
            if let Ok(secs) = value.parse() {
                self.timeout_secs = secs;
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("campus-chat").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_parses_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
project_name = "ASU Chatbot"
api_base_url = "http://chat.example.edu:9000"
timeout_secs = 30
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.api_base_url, "http://chat.example.edu:9000");
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let settings = Settings {
            project_name: "Test Bot".to_string(),
            api_base_url: "http://127.0.0.1:8123".to_string(),
            timeout_secs: 42,
        };
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(&path).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_load_from_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "http://localhost:8000");
        assert_eq!(settings.timeout_secs, 180);
    }
}
