use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::evaluator::MAX_PRECISION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Significant digits to round results to; unset shows the shortest exact form.
    pub precision: Option<usize>,
    /// Surface malformed display markup as an error instead of showing it raw.
    pub throw_on_error: bool,
    pub show_keypad: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: None,
            throw_on_error: false,
            show_keypad: true,
        }
    }
}

impl Config {
    /// Clamp values loaded from disk or the command line into range.
    pub fn normalized(mut self) -> Self {
        self.precision = self.precision.map(|p| p.clamp(1, MAX_PRECISION));
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.normalized(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
