/// Logging setup.
///
/// With a log directory, logs go to `{log_dir}/peakhours.log` and each run
/// starts with a separator line. Without one, warnings and errors go to stderr.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "peakhours.log";

/// Initializes file logging under `log_dir`.
///
/// `RUST_LOG` overrides the default `info` filter. `context` is written into
/// the session separator (usually the command being run).
///
/// Returns the path of the log file.
pub fn init_file_logging(log_dir: &Path, context: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let log_path = log_dir.join(LOG_FILE_NAME);
    write_session_separator(&log_path, context);

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok(); // Ignore error if already initialized

    tracing::info!("Logging initialized: {}", context);

    Ok(log_path)
}

/// Initializes stderr logging, `warn` unless `RUST_LOG` says otherwise.
pub fn init_stderr_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .ok();
}

fn write_session_separator(log_path: &Path, context: &str) {
    let separator = format!(
        "\n{sep}\n[{ts}] New session: {context}\n{sep}\n",
        sep = "=".repeat(80),
        ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        context = context
    );

    use std::io::Write;
    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        let _ = writeln!(file, "{}", separator);
    }
}
