use chrono::Local;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive for the debug log.
pub const LOG_FILTER_ENV: &str = "MCLAUDE_LOG";

const DEFAULT_FILTER: &str = "multi_claude=debug";

/// File name for this process's debug log: `<YYYYMMDDTHHMMSS>-<pid>.log`.
pub fn log_file_name() -> String {
    format!(
        "{}-{}.log",
        Local::now().format("%Y%m%dT%H%M%S"),
        std::process::id()
    )
}

/// Install a plain-text tracing subscriber writing to a fresh file in
/// `logs_dir`. Returns the log path, or `None` when the file could not be
/// created (logging is then disabled).
pub fn init(logs_dir: &Path) -> Option<PathBuf> {
    fs::create_dir_all(logs_dir).ok()?;
    let path = logs_dir.join(log_file_name());
    let file = File::create(&path).ok()?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()?;

    tracing::debug!(
        pid = std::process::id(),
        platform = std::env::consts::OS,
        "debug log started"
    );
    Some(path)
}
