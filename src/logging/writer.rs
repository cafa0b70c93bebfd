// SPDX-License-Identifier: Apache-2.0 OR MIT
// Output sinks driven by the writer thread

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Output sink for formatted log lines
///
/// A writer is moved into the writer thread and only ever called from there,
/// one line at a time, in queue order. It may block for as long as its I/O
/// takes. Returning an error stops the pipeline.
pub trait LogWriter: Send {
    /// Write one formatted line
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush any buffered output (called after every drain pass)
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: LogWriter + ?Sized> LogWriter for Box<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Standard output sink (writes to stdout)
pub struct StdoutWriter {
    stdout: io::Stdout,
}

impl StdoutWriter {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogWriter for StdoutWriter {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.stdout.lock(), "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

/// Standard error sink (writes to stderr)
pub struct StderrWriter {
    stderr: io::Stderr,
}

impl StderrWriter {
    pub fn new() -> Self {
        Self {
            stderr: io::stderr(),
        }
    }
}

impl Default for StderrWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogWriter for StderrWriter {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.stderr.lock(), "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stderr.flush()
    }
}

/// Appends lines to a file through a buffer flushed after each drain pass
pub struct FileWriter {
    file: BufWriter<File>,
}

impl FileWriter {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            file: BufWriter::new(file),
        })
    }
}

impl LogWriter for FileWriter {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// In-memory sink that records every line
///
/// Clones share the same buffer, so one clone can be handed to the logger
/// while another is kept to inspect what was written.
#[derive(Clone, Default)]
pub struct MemoryWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of lines written so far
    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogWriter for MemoryWriter {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }
}

/// Wraps a writer and sleeps before every line to simulate slow I/O
pub struct Delayed<W> {
    inner: W,
    delay: Duration,
}

impl<W: LogWriter> Delayed<W> {
    pub fn new(inner: W, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: LogWriter> LogWriter for Delayed<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.inner.write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
