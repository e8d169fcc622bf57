//! Configuration loaded from `config.yaml` with environment overrides
//!
//! The file is searched in this order:
//! 1. an explicit path (the `--config` option)
//! 2. the `MUSIC_MENUBAR_CONFIG` environment variable
//! 3. `<config dir>/music-menubar/config.yaml`
//!
//! A missing file is not an error, every key has a default. Individual keys
//! can then be overridden with `MUSIC_MENUBAR_*` variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::artwork::{DEFAULT_ARTWORK_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEARCH_URL};
use crate::error::{Error, Result};
use crate::poller::PollerOptions;

const ENV_CONFIG_PATH: &str = "MUSIC_MENUBAR_CONFIG";
const ENV_PREFIX: &str = "MUSIC_MENUBAR_";
const APP_DIR: &str = "music-menubar";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Milliseconds between two status polls
    pub poll_interval_ms: u64,
    /// Application name used in `tell application "..."`
    pub player_app: String,
    /// Process name looked up to decide whether the player is running
    pub process_name: String,
    pub artwork: ArtworkConfig,
    /// Default log level when `--log-level` is not given
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    pub search_url: String,
    /// Square edge length substituted into the artwork template
    pub size: u32,
    pub timeout_secs: u64,
    /// Drop lookups that complete after a newer one was issued
    pub discard_stale: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            player_app: "Music".to_string(),
            process_name: "Music".to_string(),
            artwork: ArtworkConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            size: DEFAULT_ARTWORK_SIZE,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            discard_stale: true,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Resolve the config file location, load it and apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(ENV_CONFIG_PATH).map(PathBuf::from))
            .or_else(Self::default_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!("loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            Some(path) if explicit.is_some() => {
                return Err(Error::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            _ => Self::default(),
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    /// Apply `MUSIC_MENUBAR_*` overrides obtained through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(value) = var("POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_number("POLL_INTERVAL_MS", &value)?;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = var("PLAYER_APP") {
            self.player_app = value;
        }
        if let Some(value) = var("PROCESS_NAME") {
            self.process_name = value;
        }
        if let Some(value) = var("SEARCH_URL") {
            self.artwork.search_url = value;
        }
        if let Some(value) = var("ARTWORK_SIZE") {
            self.artwork.size = parse_number("ARTWORK_SIZE", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::config("poll_interval_ms must be greater than 0"));
        }
        if self.artwork.size == 0 {
            return Err(Error::config("artwork.size must be greater than 0"));
        }
        if self.player_app.contains('"') {
            return Err(Error::config("player_app must not contain quotes"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poller_options(&self) -> PollerOptions {
        PollerOptions {
            interval: self.poll_interval(),
            discard_stale_artwork: self.artwork.discard_stale,
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{ENV_PREFIX}{name}: invalid number {value:?}")))
}
