use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::progress::DEFAULT_PROGRESS_FILE;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Segment drilling settings
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Progress file location
    #[serde(default = "default_progress_file")]
    pub progress_file: PathBuf,

    /// Suffix appended to the video stem to find its subtitle file
    #[serde(default = "default_subtitle_suffix")]
    pub subtitle_suffix: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// What `jump_to` does after moving to a segment
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JumpPolicy {
    // @policy: Start drilling the target segment right away
    #[default]
    Drill,
    // @policy: Play freely from the target; drilling starts when the tick detects it
    FreePlay,
}

impl std::fmt::Display for JumpPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drill => write!(f, "drill"),
            Self::FreePlay => write!(f, "free_play"),
        }
    }
}

impl std::str::FromStr for JumpPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "drill" => Ok(Self::Drill),
            "free_play" | "freeplay" => Ok(Self::FreePlay),
            _ => Err(anyhow::anyhow!("Invalid jump policy: {}", s)),
        }
    }
}

/// Segment repetition settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Segment to start from when no progress is stored (0-based)
    #[serde(default)]
    pub start_segment_index: usize,

    /// Pause between repetitions of a segment
    #[serde(default = "default_repeat_delay_ms")]
    pub repeat_delay_ms: u64,

    /// Pause after the last repetition before moving on
    #[serde(default)]
    pub segment_pause_ms: u64,

    /// How many times each segment is played
    #[serde(default = "default_repetitions_per_segment")]
    pub repetitions_per_segment: u32,

    /// Position sampling period
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Step applied by the extra duration commands
    #[serde(default = "default_extra_duration_step_ms")]
    pub extra_duration_step_ms: i64,

    /// Lower bound for the extra duration
    #[serde(default = "default_extra_duration_min_ms")]
    pub extra_duration_min_ms: i64,

    /// Extra duration at session start
    #[serde(default)]
    pub initial_extra_duration_ms: i64,

    /// Behaviour of explicit navigation
    #[serde(default)]
    pub jump_policy: JumpPolicy,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start_segment_index: 0,
            repeat_delay_ms: default_repeat_delay_ms(),
            segment_pause_ms: 0,
            repetitions_per_segment: default_repetitions_per_segment(),
            tick_period_ms: default_tick_period_ms(),
            extra_duration_step_ms: default_extra_duration_step_ms(),
            extra_duration_min_ms: default_extra_duration_min_ms(),
            initial_extra_duration_ms: 0,
            jump_policy: JumpPolicy::default(),
        }
    }
}

impl PlaybackConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repetitions_per_segment == 0 {
            return Err(ConfigError::Invalid("repetitions_per_segment must be at least 1".to_string()));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("tick_period_ms must be greater than 0".to_string()));
        }
        if self.extra_duration_step_ms <= 0 {
            return Err(ConfigError::Invalid("extra_duration_step_ms must be greater than 0".to_string()));
        }
        if self.initial_extra_duration_ms < self.extra_duration_min_ms {
            return Err(ConfigError::Invalid(format!(
                "initial_extra_duration_ms ({}) is below extra_duration_min_ms ({})",
                self.initial_extra_duration_ms, self.extra_duration_min_ms
            )));
        }
        Ok(())
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_repeat_delay_ms() -> u64 {
    2000
}

fn default_repetitions_per_segment() -> u32 {
    3
}

fn default_tick_period_ms() -> u64 {
    100
}

fn default_extra_duration_step_ms() -> i64 {
    1000
}

fn default_extra_duration_min_ms() -> i64 {
    -1000
}

fn default_progress_file() -> PathBuf {
    PathBuf::from(DEFAULT_PROGRESS_FILE)
}

fn default_subtitle_suffix() -> String {
    "_word_merge_translated.srt".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.playback.validate()?;

        if self.subtitle_suffix.trim().is_empty() {
            return Err(ConfigError::Invalid("subtitle_suffix must not be empty".to_string()));
        }

        Ok(())
    }

    /// Load the configuration file, writing a default one if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            playback: PlaybackConfig::default(),
            progress_file: default_progress_file(),
            subtitle_suffix: default_subtitle_suffix(),
            log_level: LogLevel::default(),
        }
    }
}
