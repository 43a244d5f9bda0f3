//! Logging initialization

use std::path::PathBuf;

use crate::config::LoggerConfig;

/// Initialize logging based on the logger configuration
///
/// Returns the log file path if debug logging is enabled. Logs go to a file
/// so applications embedding the library keep stdout/stderr to themselves.
pub fn init_logging(config: &LoggerConfig) -> Option<PathBuf> {
    if !config.debug {
        // No logging by default (silent operation)
        return None;
    }

    let log_path = log_file_path();
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_path.display(), e);
            return None;
        }
    };

    let default_filter = config.filter.as_deref().unwrap_or("debug");
    let result = tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_ansi(false) // No ANSI codes in log file
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();

    match result {
        Ok(()) => Some(log_path),
        // Another subscriber is already installed; leave it in place
        Err(_) => None,
    }
}

/// Create a named temporary log file that outlives this process' handle
fn log_file_path() -> PathBuf {
    tempfile::Builder::new()
        .prefix("kube-topology-")
        .suffix(".log")
        .tempfile()
        .ok()
        .and_then(|f| f.keep().ok())
        .map(|(_, path)| path)
        .unwrap_or_else(|| {
            std::env::temp_dir().join(format!("kube-topology-{}.log", std::process::id()))
        })
}
