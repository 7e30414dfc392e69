// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// ffmpeg binary, as a path or a name looked up in PATH
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// ffprobe binary, used to size the generated metadata
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    /// Extra ffmpeg arguments inserted before the output path (shell-style quoting)
    #[serde(default)]
    pub extra_args: String,

    /// Append rendered commands and exit statuses to this file
    #[serde(default)]
    pub debug_log: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Exit code when the input file does not exist.
    /// 0 keeps the historical "print and return" behavior.
    #[serde(default)]
    pub missing_input_exit_code: i32,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            extra_args: String::new(),
            debug_log: None,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            missing_input_exit_code: 0,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("dvmux")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("dvmux")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, falling back to built-in defaults if there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load config from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
