// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Ordered asynchronous logging.
//!
//! Producers call [`Logger::print_log_line`] from any thread. The message is
//! filtered on the caller's thread, queued, and written by a single
//! background thread in strict FIFO order. [`Logger::wait_for_drain`] blocks
//! until everything queued so far is on the sink.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError};
pub use logging::{LineFormat, LogError, LogFilter, LogWriter, Logger, LoggerBuilder};
