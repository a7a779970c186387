use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE: &str = "winplace_terminal.log";

/// Installs a file-only subscriber; the terminal itself belongs to the UI.
///
/// Returns `None` when the log directory is not writable, in which case
/// tracing events are discarded. Keep the guard alive until exit so the
/// background writer flushes.
pub fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // `rolling::daily` panics if it cannot create the first file, so check first.
    if fs::create_dir_all(log_dir).is_err() {
        return None;
    }
    let probe = log_dir.join(".winplace_write_test");
    if fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&probe)
        .is_err()
    {
        return None;
    }
    let _ = fs::remove_file(&probe);

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok()?;
    Some(guard)
}
