//! Logging setup.
//!
//! Logs go to a daily-rolling JSON file under the data directory. The TUI
//! owns the terminal, so [`init_tui`] installs no stdout layer. `log` macros
//! are bridged into `tracing`, and rolled files from earlier days are
//! gzip-compressed in the background.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Base name of the rolling log file; the appender adds a `.YYYY-MM-DD` suffix.
pub const LOG_FILE_NAME: &str = "stockdesk.log";

const DEFAULT_FILTER: &str = "info";

/// Initialize logging for TUI mode: file only, nothing written to the terminal
/// while ratatui is in raw/alternate-screen mode.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// application so buffered logs are flushed on shutdown.
pub fn init_tui(log_dir: &Path) -> WorkerGuard {
    let (writer, guard) = file_writer(log_dir);

    let result = tracing_subscriber::registry()
        .with(json_layer(writer, env_filter()))
        .try_init();
    finish_init(result.is_ok(), log_dir);

    guard
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn file_writer(log_dir: &Path) -> (NonBlocking, WorkerGuard) {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory {}: {e}", log_dir.display());
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    tracing_appender::non_blocking(file_appender)
}

fn json_layer<S>(
    writer: NonBlocking,
    filter: EnvFilter,
) -> impl Layer<S> + Send + Sync + 'static
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span> + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(filter)
}

fn finish_init(installed: bool, log_dir: &Path) {
    if !installed {
        eprintln!("Global tracing subscriber already set; keeping the existing one");
        return;
    }

    // Redirect `log` macros to `tracing`
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {e}");
    }

    // Compress after init so the log macros inside work
    let dir = log_dir.to_path_buf();
    std::thread::spawn(move || compress_old_logs(&dir));

    log::info!(
        "Logging initialized. Writing to: {} (daily rolling)",
        log_dir.join(LOG_FILE_NAME).display()
    );
}

/// Gzip every rolled log file except today's. Returns the paths written.
pub fn compress_old_logs(log_dir: &Path) -> Vec<PathBuf> {
    let today_suffix = chrono::Local::now().format("%Y-%m-%d").to_string();
    let mut compressed = Vec::new();

    let Ok(entries) = fs::read_dir(log_dir) else {
        return compressed;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_stale_log(name, &today_suffix) {
            continue;
        }
        match compress_file(&path) {
            Ok(gz_path) => {
                log::info!("Compressed old log: {}", path.display());
                compressed.push(gz_path);
            }
            Err(e) => log::warn!("Failed to compress old log {}: {e}", path.display()),
        }
    }

    compressed
}

/// A rolled file (`stockdesk.log.YYYY-MM-DD`) that isn't today's and isn't compressed yet.
fn is_stale_log(name: &str, today_suffix: &str) -> bool {
    name.strip_prefix(LOG_FILE_NAME)
        .and_then(|rest| rest.strip_prefix('.'))
        .map(|suffix| suffix != today_suffix && !suffix.ends_with(".gz"))
        .unwrap_or(false)
}

fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let gz_path = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No parent directory"))?
        .join(gz_name);

    if gz_path.exists() {
        return Ok(gz_path);
    }

    let mut reader = io::BufReader::new(fs::File::open(path)?);
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path)?, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(gz_path)
}
