use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration, read from `config.json`.
///
/// A missing file means defaults; a file that exists but fails to parse is
/// reported and ignored rather than aborting the run. The API key has no
/// default and is checked separately before any network activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// puush.me API key. Required at runtime; `null` and absent both count
    /// as unconfigured.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Fixed pause before every deletion call, in seconds.
    #[serde(default = "default_rate_limit_delay")]
    pub api_rate_limit_delay_seconds: f64,

    /// Mirror key events into a log file under the config directory.
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
}

fn default_rate_limit_delay() -> f64 {
    5.0
}

fn default_log_to_file() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            api_rate_limit_delay_seconds: default_rate_limit_delay(),
            log_to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Load configuration from the platform config directory.
    pub fn load() -> Result<Self> {
        Self::load_from(&ConfigManager::config_file_path()?)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                eprintln!(
                    "Error: could not parse config file {}: {err}. \
                     Falling back to default config.",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// The API key, or a startup error when the config never provided one.
    /// Checked before any network call is made.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => anyhow::bail!("Missing or unset config entry: api_key, aborting!"),
        }
    }

    /// The rate-limit delay as a [`Duration`]. Negative values clamp to
    /// zero rather than panicking in `Duration::from_secs_f64`.
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs_f64(self.api_rate_limit_delay_seconds.max(0.0))
    }
}

/// Cross-platform configuration directory manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the main configuration directory path following platform conventions:
    /// - Linux: $XDG_CONFIG_HOME/sane-psh or ~/.config/sane-psh
    /// - macOS: ~/Library/Application Support/sane-psh
    /// - Windows: %APPDATA%\sane-psh
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            // Follow XDG Base Directory Specification
            if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
                Ok(PathBuf::from(xdg_config).join("sane-psh"))
            } else {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                Ok(home.join(".config").join("sane-psh"))
            }
        }

        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home
                .join("Library")
                .join("Application Support")
                .join("sane-psh"))
        }

        #[cfg(target_os = "windows")]
        {
            Ok(dirs::config_dir()
                .context("Failed to get Windows config directory")?
                .join("sane-psh"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(".sane-psh"))
        }
    }

    /// Get the config file path (config.json)
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("sane-psh.log"))
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
        Ok(config_dir)
    }
}
