// SPDX-License-Identifier: Apache-2.0 OR MIT
use anyhow::{Context, Result};
use clap::Parser;
use ordered_log::config::{Config, FilterSpec, WriterSpec, WriterTarget};
use ordered_log::{log_line, Logger};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug, PartialEq)]
enum Command {
    /// Log numbered lines with a client-side delay, then wait for the drain
    Demo {
        #[arg(long, default_value_t = 100)]
        count: usize,
        #[arg(long, default_value_t = 10)]
        client_delay_ms: u64,
        /// Pipeline configuration (JSON5); defaults to a date-stamping stdout pipeline
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Log every line read from stdin
    Pipe {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Parse and validate a configuration file, then print it normalized
    CheckConfig { path: PathBuf },
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so they never mix with pipeline output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Demo {
            count,
            client_delay_ms,
            config,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => demo_config(),
            };
            run_demo(&config, count, Duration::from_millis(client_delay_ms))?;
        }
        Command::Pipe { config } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => Config::default(),
            };
            run_pipe(&config)?;
        }
        Command::CheckConfig { path } => {
            let config = load_config(&path)?;
            config.validate()?;
            println!("{}", config.to_json5());
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_from_file(path)
        .with_context(|| format!("loading configuration from {}", path.display()))
}

/// Stripped, date-stamped lines on a deliberately slow stdout writer
fn demo_config() -> Config {
    Config {
        writer: WriterSpec {
            target: WriterTarget::Stdout,
            delay_ms: 20,
        },
        filters: vec![
            FilterSpec::RemoveSpecialCharacters,
            FilterSpec::AddDate {
                format: ordered_log::logging::DEFAULT_DATE_FORMAT.to_string(),
            },
        ],
        ..Default::default()
    }
}

fn run_demo(config: &Config, count: usize, client_delay: Duration) -> Result<()> {
    let logger = config.build_logger().context("starting logger")?;
    tracing::info!(count, worker = %logger.worker_id(), "demo started");

    for i in 0..count {
        log_line!(logger, "Number {} \n", i)?;
        if !client_delay.is_zero() {
            std::thread::sleep(client_delay);
        }
    }

    logger.wait_for_drain()?;
    logger.shutdown()?;
    Ok(())
}

fn run_pipe(config: &Config) -> Result<()> {
    let logger: Logger = config.build_logger().context("starting logger")?;

    for line in std::io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        logger.print_log_line(line)?;
    }

    logger.wait_for_drain()?;
    logger.shutdown()?;
    Ok(())
}
