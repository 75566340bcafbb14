use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::StaleReplyPolicy;

const REPLY_DELAY_ENV: &str = "VOYAGEMART_REPLY_DELAY_MS";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pause before a canned reply shows up, in milliseconds
    pub reply_delay_ms: u64,

    /// Fate of replies that arrive after their conversation was replaced
    pub stale_replies: StaleReplyPolicy,

    /// UI preferences
    pub ui: UiConfig,

    /// VoyageMart home directory
    #[serde(skip)]
    pub home: PathBuf,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_splash: bool,
    pub splash_ms: u64,
    /// Below this terminal width the sidebar collapses after a selection
    pub narrow_width: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_splash: true,
            splash_ms: 2500,
            narrow_width: 80,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            reply_delay_ms: 1000,
            stale_replies: StaleReplyPolicy::default(),
            ui: UiConfig::default(),
            home: home.join(".voyagemart"),
        }
    }
}

impl Config {
    /// Load configuration from `~/.voyagemart/config.toml`, falling back to defaults
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let voyagemart_home = home.join(".voyagemart");

        fs::create_dir_all(&voyagemart_home)
            .context("Failed to create .voyagemart directory")?;

        let mut config = Self::load_from(&voyagemart_home.join("config.toml"))?;
        config.home = voyagemart_home;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Config::default()
        };

        if let Some(parent) = path.parent() {
            config.home = parent.to_path_buf();
        }
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.home)
            .context("Failed to create .voyagemart directory")?;
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(self.config_path(), content)
            .context("Failed to write config file")?;
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.home.join("logs").join("voyagemart.log")
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn splash_duration(&self) -> Duration {
        Duration::from_millis(self.ui.splash_ms)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(delay) = std::env::var(REPLY_DELAY_ENV)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            self.reply_delay_ms = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.reply_delay_ms, 1000);
        assert_eq!(config.stale_replies, StaleReplyPolicy::Drop);
        assert_eq!(config.ui, UiConfig::default());
        assert_eq!(config.home, dir.path());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "stale_replies = \"keep\"\n[ui]\nsplash_ms = 0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.stale_replies, StaleReplyPolicy::Keep);
        assert_eq!(config.ui.splash_ms, 0);
        assert!(config.ui.show_splash);
        assert_eq!(config.reply_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "reply_delay_ms = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        config.reply_delay_ms = 250;
        config.ui.narrow_width = 100;
        config.save().unwrap();

        let loaded = Config::load_from(&config.config_path()).unwrap();
        assert_eq!(loaded, config);
    }
}
