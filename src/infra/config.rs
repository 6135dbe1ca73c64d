//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. Default: config/dev.toml
//!
//! A missing or invalid file falls back to defaults with a warning, so the
//! station still comes up on a bare machine.

use crate::services::parser::PayloadConvention;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    /// Station identifier included in log output
    #[serde(default = "default_station_id")]
    pub id: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self { id: default_station_id() }
    }
}

fn default_station_id() -> String {
    "intake".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// JSONL frame script consumed by the replay source
    #[serde(default = "default_replay_file")]
    pub replay_file: String,
    /// Stop after this many frames (0 = unlimited)
    #[serde(default)]
    pub max_frames: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { replay_file: default_replay_file(), max_frames: 0 }
    }
}

fn default_replay_file() -> String {
    "frames.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PayloadConfig {
    /// Payload convention: "comma5" (current) or "pipe4" (legacy)
    #[serde(default)]
    pub convention: PayloadConvention,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// CSV store for accepted records
    #[serde(default = "default_sink_file")]
    pub file: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self { file: default_sink_file() }
    }
}

fn default_sink_file() -> String {
    "records.csv".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub payload: PayloadConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    station_id: String,
    replay_file: String,
    max_frames: u64,
    payload_convention: PayloadConvention,
    sink_file: String,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station_id: default_station_id(),
            replay_file: default_replay_file(),
            max_frames: 0,
            payload_convention: PayloadConvention::default(),
            sink_file: default_sink_file(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            station_id: toml_config.station.id,
            replay_file: toml_config.capture.replay_file,
            max_frames: toml_config.capture.max_frames,
            payload_convention: toml_config.payload.convention,
            sink_file: toml_config.sink.file,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    // Getters for all config fields
    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn replay_file(&self) -> &str {
        &self.replay_file
    }

    pub fn max_frames(&self) -> u64 {
        self.max_frames
    }

    pub fn payload_convention(&self) -> PayloadConvention {
        self.payload_convention
    }

    pub fn sink_file(&self) -> &str {
        &self.sink_file
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }
}
