// src/config.rs
//! Configuration loading with file-backed storage and defaults

use crate::error::{GpsError, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Serial device path; auto-detected when unset
    pub serial_port: Option<String>,
    pub serial_baudrate: u32,
    pub serial_timeout_secs: u64,
    /// Civil timezone fixes are stamped in
    pub timezone: String,
    /// Destination file for recorded fixes
    pub output_path: String,
    pub log_dir: String,
    pub log_file: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            serial_port: None,
            serial_baudrate: 9600,
            serial_timeout_secs: 1,
            timezone: "Asia/Kolkata".to_string(),
            output_path: "gps_fixes.jsonl".to_string(),
            log_dir: "logs".to_string(),
            log_file: "gps-recorder.log".to_string(),
        }
    }
}

impl RecorderConfig {
    /// Load configuration from the default location, falling back to
    /// defaults when no config file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file. Missing keys take their
    /// default values; a missing file yields the full default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| GpsError::Config(format!("failed to read config file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| GpsError::Config(format!("failed to parse config file: {}", e)))
    }

    /// The civil timezone, parsed from its IANA name.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| GpsError::Config(format!("unknown timezone: {:?}", self.timezone)))
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| GpsError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("gps-recorder")
            .join("config.json"))
    }
}
