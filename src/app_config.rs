use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::ConfigError;

/// Application configuration module
/// This module handles loading and validating the settings shared by the
/// stub generator and the markup renderer.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Stub generation settings
    #[serde(default)]
    pub stubs: StubConfig,

    /// Timeline extension settings
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Config {
    /// Load a configuration file, falling back to defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Check that every setting holds a usable value
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.stubs.validate()
    }
}

/// Settings for the annotation-driven stub generator
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StubConfig {
    /// Annotation token searched for in source comments
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Object domain used in the generated `autoobject` directive
    #[serde(default = "default_object_domain")]
    pub object_domain: String,

    /// Extension given to every generated file (without the dot)
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            object_domain: default_object_domain(),
            output_extension: default_output_extension(),
        }
    }
}

impl StubConfig {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.marker.is_empty() {
            return Err(ConfigError::Empty("stubs.marker"));
        }
        if self.marker.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                key: "stubs.marker",
                reason: format!("'{}' contains whitespace", self.marker),
            });
        }
        if self.object_domain.is_empty() {
            return Err(ConfigError::Empty("stubs.object_domain"));
        }
        if !self.object_domain.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Invalid {
                key: "stubs.object_domain",
                reason: format!("'{}' is not a plain identifier", self.object_domain),
            });
        }
        if self.output_extension.is_empty() {
            return Err(ConfigError::Empty("stubs.output_extension"));
        }
        if self.output_extension.starts_with('.') || self.output_extension.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                key: "stubs.output_extension",
                reason: format!("'{}' must be a bare extension such as 'rst'", self.output_extension),
            });
        }
        Ok(())
    }
}

/// Settings for the timeline markup extension
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TimelineConfig {
    /// Whether the section promotion transform is registered
    #[serde(default)]
    pub promote_sections: bool,
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
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_marker() -> String {
    "@class".to_string()
}

fn default_object_domain() -> String {
    "lua".to_string()
}

fn default_output_extension() -> String {
    "rst".to_string()
}
