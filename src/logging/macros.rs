// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros for convenient logging

/// Format a message and queue it on a [`Logger`](crate::logging::Logger)
///
/// Evaluates to the `Result` of
/// [`print_log_line`](crate::logging::Logger::print_log_line).
///
/// # Examples
/// ```ignore
/// log_line!(logger, "worker {} started", id)?;
/// ```
#[macro_export]
macro_rules! log_line {
    ($logger:expr, $msg:expr) => {
        $logger.print_log_line($msg)
    };
    ($logger:expr, $fmt:expr, $($arg:tt)+) => {
        $logger.print_log_line(format!($fmt, $($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::{LineFormat, Logger, MemoryWriter};

    #[test]
    fn test_log_line_macro() {
        let recorder = MemoryWriter::new();
        let logger = Logger::builder(recorder.clone())
            .line_format(LineFormat::Plain)
            .build()
            .unwrap();

        log_line!(logger, "plain").unwrap();
        log_line!(logger, "value {} of {}", 1, 2).unwrap();
        log_line!(logger, "named {x}", x = "arg").unwrap();
        logger.wait_for_drain().unwrap();

        assert_eq!(recorder.lines(), vec!["plain", "value 1 of 2", "named arg"]);
    }
}
