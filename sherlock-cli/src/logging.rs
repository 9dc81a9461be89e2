//! Logging setup for the CLI
//!
//! Console output always goes to stderr so that JSON/YAML on stdout stays
//! parseable. A daily-rolling file layer is added when a log directory is
//! configured.

use sherlock_common::config::LoggingConfig;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_NAME: &str = "sherlock.log";

/// Initialize logging. `RUST_LOG` takes precedence over the configured level.
///
/// The returned guard flushes the file writer on drop and must be held until
/// the process exits.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_ansi(true)
        .with_writer(io::stderr);

    let guard = match config.log_dir {
        Some(ref dir) => {
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_NAME));

            let file_layer = if config.json_format {
                fmt::layer()
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .json()
                    .with_writer(writer)
                    .boxed()
            } else {
                fmt::layer()
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_writer(writer)
                    .boxed()
            };

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()?;
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init()?;
            None
        }
    };

    tracing::debug!(level = %config.level, file_logging = guard.is_some(), "Logging initialized");

    Ok(guard)
}
