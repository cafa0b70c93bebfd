// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logger facade: filter on the caller, queue, write on a dedicated thread

use super::error::LogError;
use super::filter::{FilterPipeline, LogFilter};
use super::gate::CompletionGate;
use super::queue::MessageQueue;
use super::worker::{LineFormat, Worker, WorkerId};
use super::writer::LogWriter;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

/// State shared with the writer thread
#[derive(Debug, Default)]
struct Shared {
    queue: MessageQueue,
    gate: CompletionGate,
}

struct Inner {
    shared: Arc<Shared>,
    pipeline: FilterPipeline,
    worker_id: WorkerId,
    handle: Mutex<Option<JoinHandle<io::Result<()>>>>,
}

impl Inner {
    fn join_worker(&self) -> Result<(), LogError> {
        self.shared.gate.request_shutdown();
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return Ok(());
        };
        match handle.join() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(LogError::Writer(e)),
            Err(_) => Err(LogError::WorkerPanicked),
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Last handle gone: finish the queue before the writer is torn down
        if let Err(e) = self.join_worker() {
            tracing::warn!(worker = %self.worker_id, error = %e, "log writer did not shut down cleanly");
        }
    }
}

/// Handle to an ordered asynchronous logging pipeline
///
/// `print_log_line` filters the message on the calling thread, queues it and
/// returns without waiting for I/O. A single writer thread writes queued
/// lines in exactly the order they were accepted, across all producers.
///
/// Clones share the same queue and writer thread. Dropping the last clone
/// drains the queue and joins the writer thread.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    /// Start configuring a logger that writes through `writer`
    pub fn builder(writer: impl LogWriter + 'static) -> LoggerBuilder {
        LoggerBuilder::new(writer)
    }

    /// Create a logger with an optional filter chain and default settings
    pub fn new(
        writer: impl LogWriter + 'static,
        filters: Option<Vec<Arc<dyn LogFilter>>>,
    ) -> Result<Self, LogError> {
        Self::builder(writer)
            .filters(filters.unwrap_or_default())
            .build()
    }

    /// Filter `message`, queue it and wake the writer thread
    ///
    /// Never blocks on the writer. Fails once the logger has been shut down
    /// or the writer thread has stopped after a write error.
    pub fn print_log_line(&self, message: impl AsRef<str>) -> Result<(), LogError> {
        let filtered = self.inner.pipeline.apply(message.as_ref());
        let shared = &self.inner.shared;
        shared.gate.admit(|| shared.queue.enqueue(filtered))
    }

    /// Block until every message accepted so far has been written
    ///
    /// Returns immediately when nothing is pending.
    pub fn wait_for_drain(&self) -> Result<(), LogError> {
        self.inner.shared.gate.wait_for_drain()
    }

    /// Bounded [`wait_for_drain`](Self::wait_for_drain); `Ok(false)` on timeout
    pub fn wait_for_drain_timeout(&self, timeout: Duration) -> Result<bool, LogError> {
        self.inner.shared.gate.wait_for_drain_timeout(timeout)
    }

    /// Wait for the drain on the blocking pool, for use from async tasks
    pub async fn wait_for_drain_async(&self) -> Result<(), LogError> {
        let shared = Arc::clone(&self.inner.shared);
        tokio::task::spawn_blocking(move || shared.gate.wait_for_drain())
            .await
            .map_err(|e| LogError::Join(e.to_string()))?
    }

    /// Stop accepting messages, write what is queued and join the writer
    ///
    /// Affects every clone. Returns the write error if the writer thread
    /// stopped because of one.
    pub fn shutdown(self) -> Result<(), LogError> {
        tracing::debug!(worker = %self.inner.worker_id, "log writer shutdown requested");
        self.inner.join_worker()
    }

    /// Identifier used to tag lines written by this logger's writer thread
    pub fn worker_id(&self) -> WorkerId {
        self.inner.worker_id
    }

    /// Messages accepted and not yet written
    pub fn pending(&self) -> usize {
        self.inner.shared.gate.pending()
    }

    /// Check if the logger no longer accepts messages
    pub fn is_closed(&self) -> bool {
        self.inner.shared.gate.is_closed()
    }

    /// The filter chain applied to every message
    pub fn filters(&self) -> &FilterPipeline {
        &self.inner.pipeline
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("worker_id", &self.inner.worker_id)
            .field("filters", &self.inner.pipeline)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Builder for [`Logger`]
pub struct LoggerBuilder {
    writer: Box<dyn LogWriter>,
    filters: Vec<Arc<dyn LogFilter>>,
    line_format: LineFormat,
    thread_name: String,
}

impl LoggerBuilder {
    fn new(writer: impl LogWriter + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            filters: Vec::new(),
            line_format: LineFormat::default(),
            thread_name: "ordered-log-writer".to_string(),
        }
    }

    /// Append one filter to the chain
    pub fn filter(mut self, filter: impl LogFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append several filters, keeping their order
    pub fn filters(mut self, filters: impl IntoIterator<Item = Arc<dyn LogFilter>>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn line_format(mut self, line_format: LineFormat) -> Self {
        self.line_format = line_format;
        self
    }

    /// Name of the writer thread
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Spawn the writer thread and return the logger
    pub fn build(self) -> Result<Logger, LogError> {
        let shared = Arc::new(Shared::default());
        let worker_id = WorkerId::next();
        let worker = Worker::new(worker_id, self.line_format, self.writer);

        let handle = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name(self.thread_name)
                .spawn(move || worker.run(&shared.queue, &shared.gate))
                .map_err(LogError::Spawn)?
        };

        Ok(Logger {
            inner: Arc::new(Inner {
                shared,
                pipeline: FilterPipeline::new(self.filters),
                worker_id,
                handle: Mutex::new(Some(handle)),
            }),
        })
    }
}
