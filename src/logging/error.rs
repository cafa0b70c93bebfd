// SPDX-License-Identifier: Apache-2.0 OR MIT
// Error types for the logging pipeline

use thiserror::Error;

/// Errors surfaced by the [`Logger`](super::Logger) facade
#[derive(Error, Debug)]
pub enum LogError {
    #[error("logger has been shut down")]
    Closed,

    #[error("writer thread stopped after a write failure: {0}")]
    WorkerFailed(String),

    #[error("writer thread stopped with {pending} message(s) still pending")]
    WorkerStopped { pending: usize },

    #[error("failed to write log line: {0}")]
    Writer(#[source] std::io::Error),

    #[error("failed to spawn writer thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("writer thread panicked")]
    WorkerPanicked,

    #[error("drain wait task failed: {0}")]
    Join(String),
}

/// Errors raised while constructing a filter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("date format must not be empty")]
    EmptyDateFormat,

    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),
}
