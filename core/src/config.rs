use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_DIR_NAME: &str = ".rollcall";
const CONFIG_FILE_NAME: &str = "config.json";

/// Upper bound for `history_days` and `trend_days`.
pub const MAX_DAYS: u32 = 3650;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Generator seed. A fresh seed is drawn when unset.
    pub seed: Option<u64>,
    pub history_days: u32,
    pub trend_days: u32,
    pub low_attendance_threshold: f64,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            history_days: 30,
            trend_days: 7,
            low_attendance_threshold: 85.0,
            data_dir: None,
        }
    }
}

impl Config {
    /// Loads `path`, or `~/.rollcall/config.json` when no path is given.
    /// Only the default location may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = default_dir()?.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.low_attendance_threshold) {
            return Err(anyhow!(
                "low_attendance_threshold must be within 0..=100, got {}",
                self.low_attendance_threshold
            ));
        }
        if !(1..=MAX_DAYS).contains(&self.history_days) {
            return Err(anyhow!("history_days must be within 1..={}, got {}", MAX_DAYS, self.history_days));
        }
        if self.trend_days > MAX_DAYS {
            return Err(anyhow!("trend_days must be at most {}, got {}", MAX_DAYS, self.trend_days));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_dir(),
        }
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("logs"))
    }
}

fn default_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}
