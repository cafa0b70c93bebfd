// SPDX-License-Identifier: Apache-2.0 OR MIT
// Ordered asynchronous logging pipeline
//
// Producers filter and enqueue on their own thread; one writer thread drains
// the queue in FIFO order and hands each line to the configured sink.

mod error;
mod filter;
mod gate;
mod logger;
#[macro_use]
mod macros;
mod queue;
mod worker;
mod writer;

// Public exports
pub use error::{FilterError, LogError};
pub use filter::{
    AddDateFilter, FilterPipeline, LogFilter, RemoveSpecialCharactersFilter, ReplaceRegexFilter,
    DEFAULT_DATE_FORMAT,
};
pub use gate::CompletionGate;
pub use logger::{Logger, LoggerBuilder};
pub use queue::MessageQueue;
pub use worker::{LineFormat, WorkerId};
pub use writer::{Delayed, FileWriter, LogWriter, MemoryWriter, StderrWriter, StdoutWriter};
