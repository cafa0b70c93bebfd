// SPDX-License-Identifier: Apache-2.0 OR MIT
// Writer thread: drains the queue in FIFO order and feeds the sink

use super::gate::{CompletionGate, Wakeup};
use super::queue::MessageQueue;
use super::writer::LogWriter;
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identifier of a writer thread, unique within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u32);

impl WorkerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a queued message is rendered before it reaches the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    /// `"<worker-id> <message>"`
    #[default]
    Tagged,
    /// The filtered message as-is
    Plain,
}

impl LineFormat {
    pub fn render(self, worker: WorkerId, message: &str) -> String {
        match self {
            LineFormat::Tagged => format!("{} {}", worker, message),
            LineFormat::Plain => message.to_string(),
        }
    }
}

/// Writer thread state
pub(crate) struct Worker<W> {
    id: WorkerId,
    format: LineFormat,
    writer: W,
}

impl<W: LogWriter> Worker<W> {
    pub(crate) fn new(id: WorkerId, format: LineFormat, writer: W) -> Self {
        Self { id, format, writer }
    }

    /// Run until shutdown is requested and the queue is empty, or until the
    /// writer fails
    ///
    /// The only suspension point is [`CompletionGate::wait_for_work`].
    pub(crate) fn run(mut self, queue: &MessageQueue, gate: &CompletionGate) -> io::Result<()> {
        // Releases drain waiters even if the writer panics
        let _stopped = StopOnExit(gate);
        tracing::debug!(worker = %self.id, format = ?self.format, "log writer started");

        let result = loop {
            match gate.wait_for_work() {
                Wakeup::Shutdown => break Ok(()),
                Wakeup::Work => {}
            }

            let (written, outcome) = self.drain_pass(queue);
            // Lines written before a failure still count as delivered
            gate.complete(written);
            if let Err(e) = outcome {
                break Err(e);
            }
        };

        match &result {
            Ok(()) => tracing::debug!(worker = %self.id, "log writer stopped"),
            Err(e) => {
                gate.fail(e.to_string());
                tracing::error!(worker = %self.id, error = %e, "log writer failed, pipeline stopped");
            }
        }
        result
    }

    /// Dequeue and write until the queue is observed empty, then flush
    fn drain_pass(&mut self, queue: &MessageQueue) -> (usize, io::Result<()>) {
        let mut written = 0;
        while let Some(message) = queue.try_dequeue() {
            let line = self.format.render(self.id, &message);
            if let Err(e) = self.writer.write_line(&line) {
                return (written, Err(e));
            }
            written += 1;
        }

        if written > 0 {
            if let Err(e) = self.writer.flush() {
                // Unflushed lines are not known to be on the sink
                return (0, Err(e));
            }
        }
        (written, Ok(()))
    }
}

struct StopOnExit<'a>(&'a CompletionGate);

impl Drop for StopOnExit<'_> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogError, MemoryWriter};

    struct FailingWriter {
        fail_on: usize,
        seen: usize,
    }

    impl LogWriter for FailingWriter {
        fn write_line(&mut self, _line: &str) -> io::Result<()> {
            self.seen += 1;
            if self.seen == self.fail_on {
                return Err(io::Error::other("sink unavailable"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_worker_ids_unique() {
        let a = WorkerId::next();
        let b = WorkerId::next();
        assert_ne!(a, b);
        assert!(b.as_u32() > a.as_u32());
    }

    #[test]
    fn test_line_format_render() {
        let id = WorkerId(7);
        assert_eq!(LineFormat::Tagged.render(id, "hello"), "7 hello");
        assert_eq!(LineFormat::Plain.render(id, "hello"), "hello");
        assert_eq!(LineFormat::default(), LineFormat::Tagged);
    }

    #[test]
    fn test_worker_drains_then_exits_on_shutdown() {
        let queue = MessageQueue::new();
        let gate = CompletionGate::new();
        let recorder = MemoryWriter::new();

        for i in 0..5 {
            gate.admit(|| queue.enqueue(i.to_string())).unwrap();
        }
        gate.request_shutdown();

        let worker = Worker::new(WorkerId(1), LineFormat::Plain, recorder.clone());
        worker.run(&queue, &gate).unwrap();

        assert_eq!(recorder.lines(), vec!["0", "1", "2", "3", "4"]);
        assert_eq!(gate.pending(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_worker_failure_stops_pipeline() {
        let queue = MessageQueue::new();
        let gate = CompletionGate::new();

        for i in 0..3 {
            gate.admit(|| queue.enqueue(i.to_string())).unwrap();
        }

        let worker = Worker::new(
            WorkerId(2),
            LineFormat::Tagged,
            FailingWriter {
                fail_on: 2,
                seen: 0,
            },
        );
        let err = worker.run(&queue, &gate).unwrap_err();
        assert_eq!(err.to_string(), "sink unavailable");

        // First line was delivered, the failed one and the rest were not
        assert_eq!(gate.pending(), 2);
        assert!(matches!(
            gate.wait_for_drain(),
            Err(LogError::WorkerFailed(_))
        ));
    }
}
