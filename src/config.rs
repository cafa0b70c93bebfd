// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Configuration file types and parsing for the logging pipeline.
//!
//! JSON5 configuration format supporting:
//! - An ordered filter chain
//! - Writer target (stdout, stderr or a file) with an optional per-line delay
//! - Line format (tagged with the writer id, or plain)
//! - Comments and trailing commas

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::logging::{
    AddDateFilter, Delayed, FileWriter, LineFormat, LogFilter, LogWriter, Logger,
    RemoveSpecialCharactersFilter, ReplaceRegexFilter, StderrWriter, StdoutWriter,
};

/// Pipeline configuration (JSON5 file format)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// How lines are rendered before they reach the writer
    #[serde(default)]
    pub line_format: LineFormat,

    /// Output sink
    #[serde(default)]
    pub writer: WriterSpec,

    /// Filters, applied in the listed order
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

/// Where lines go and how slowly
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WriterSpec {
    #[serde(default)]
    pub target: WriterTarget,

    /// Artificial delay before each line, in milliseconds
    #[serde(default, skip_serializing_if = "is_zero")]
    pub delay_ms: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Where the writer sends its lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriterTarget {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

/// One entry of the filter chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// Prefix the local date/time
    AddDate {
        #[serde(default = "default_date_format")]
        format: String,
    },
    /// Replace every regex match
    ReplaceRegex {
        pattern: String,
        #[serde(default)]
        replacement: String,
    },
    /// Keep only ASCII letters, digits and spaces
    RemoveSpecialCharacters,
}

fn default_date_format() -> String {
    crate::logging::DEFAULT_DATE_FORMAT.to_string()
}

impl FilterSpec {
    /// Construct the filter this entry describes
    pub fn build(&self) -> Result<Arc<dyn LogFilter>, crate::logging::FilterError> {
        let filter: Arc<dyn LogFilter> = match self {
            FilterSpec::AddDate { format } => Arc::new(AddDateFilter::with_format(format.clone())?),
            FilterSpec::ReplaceRegex {
                pattern,
                replacement,
            } => Arc::new(ReplaceRegexFilter::new(pattern, replacement.clone())?),
            FilterSpec::RemoveSpecialCharacters => Arc::new(RemoveSpecialCharactersFilter::new()),
        };
        Ok(filter)
    }
}

impl Config {
    /// Load configuration from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to JSON5 string (with pretty formatting)
    pub fn to_json5(&self) -> String {
        // Plain JSON is valid JSON5, and serde_json can pretty-print
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5();
        std::fs::write(path, content)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let WriterTarget::File(path) = &self.writer.target {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidWriter(
                    "file target needs a non-empty path".to_string(),
                ));
            }
        }

        for (index, spec) in self.filters.iter().enumerate() {
            spec.build().map_err(|e| ConfigError::InvalidFilter {
                index,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Construct the filter chain, in order
    pub fn build_filters(&self) -> Result<Vec<Arc<dyn LogFilter>>, ConfigError> {
        self.filters
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.build().map_err(|e| ConfigError::InvalidFilter {
                    index,
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// Open the configured writer
    pub fn build_writer(&self) -> Result<Box<dyn LogWriter>, ConfigError> {
        let writer: Box<dyn LogWriter> = match &self.writer.target {
            WriterTarget::Stdout => Box::new(StdoutWriter::new()),
            WriterTarget::Stderr => Box::new(StderrWriter::new()),
            WriterTarget::File(path) => Box::new(
                FileWriter::open(path)
                    .map_err(|e| ConfigError::IoError(path.clone(), e.to_string()))?,
            ),
        };

        if self.writer.delay_ms == 0 {
            return Ok(writer);
        }
        let delay = Duration::from_millis(self.writer.delay_ms);
        Ok(Box::new(Delayed::new(writer, delay)))
    }

    /// Validate, then build and start a logger from this configuration
    pub fn build_logger(&self) -> Result<Logger, ConfigError> {
        self.validate()?;
        Logger::builder(self.build_writer()?)
            .filters(self.build_filters()?)
            .line_format(self.line_format)
            .build()
            .map_err(|e| ConfigError::Logger(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    IoError(PathBuf, String),
    ParseError(String),
    InvalidFilter { index: usize, reason: String },
    InvalidWriter(String),
    Logger(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, msg) => {
                write!(f, "failed to access '{}': {}", path.display(), msg)
            }
            ConfigError::ParseError(msg) => write!(f, "failed to parse config: {}", msg),
            ConfigError::InvalidFilter { index, reason } => {
                write!(f, "invalid filter {}: {}", index, reason)
            }
            ConfigError::InvalidWriter(reason) => write!(f, "invalid writer: {}", reason),
            ConfigError::Logger(msg) => write!(f, "failed to start logger: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
