//! Logging setup for the palette CLI
//
// Every run writes a plain log file into its own timestamped folder under the
// app data logs directory. Console output is only added with `--verbose`.
//
// Usage:
//   Call `logging::init(&paths.logs_dir, verbose)` at the start of main().
//   Keep the returned guard alive for the program's duration.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::fmt::{
    format::{FormatEvent, FormatFields, Writer},
    FmtContext,
};
use tracing_subscriber::registry::LookupSpan;

pub const LOG_FILE_NAME: &str = "palette.log";

#[allow(dead_code)]
pub struct LogGuard(tracing_appender::non_blocking::WorkerGuard);

/// Installs the global subscriber.
///
/// - `logs_dir`: parent of the per-run log folders
/// - `verbose`: also log to stderr with colors
pub fn init(logs_dir: &Path, verbose: bool) -> Result<LogGuard> {
    let log_folder = logs_dir.join(Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
    fs::create_dir_all(&log_folder)
        .with_context(|| format!("Failed to create log folder {:?}", log_folder))?;
    let log_path = log_folder.join(LOG_FILE_NAME);
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {:?} for writing", log_path))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    use tracing_subscriber::prelude::*;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    if verbose {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .event_format(ConsoleFormatter);
        registry.with(console_layer).init();
    } else {
        registry.init();
    }

    Ok(LogGuard(guard))
}

/// Compact colored console output: time, level, target, message
pub struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let (level_str, level_color) = match *meta.level() {
            tracing::Level::ERROR => ("ERROR", "\x1b[1;91m"),
            tracing::Level::WARN => ("WARN ", "\x1b[1;93m"),
            tracing::Level::INFO => ("INFO ", "\x1b[1;94m"),
            tracing::Level::DEBUG => ("DEBUG", "\x1b[1;92m"),
            tracing::Level::TRACE => ("TRACE", "\x1b[1;95m"),
        };
        write!(writer, "\x1b[2;36m{}\x1b[0m ", Local::now().format("%H:%M:%S"))?;
        write!(writer, "{}{}\x1b[0m ", level_color, level_str)?;
        write!(writer, "\x1b[2;33m{}\x1b[0m: ", meta.target())?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
