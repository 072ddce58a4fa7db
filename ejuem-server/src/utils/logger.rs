//! Logging Infrastructure
//!
//! `tracing-subscriber` with an env filter; optional daily rolling file output.

use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Initialize the logger (stdout only)
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` 优先于 `log_level`。重复初始化时静默忽略。
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir.and_then(prepare_log_dir) {
        let file_appender = tracing_appender::rolling::daily(dir, "ejuem-server");
        let _ = subscriber.with_ansi(false).with_writer(file_appender).try_init();
        return;
    }

    let _ = subscriber.try_init();
}

/// Make sure the log directory exists; `None` if it cannot be created
pub fn prepare_log_dir(dir: &str) -> Option<PathBuf> {
    let path = Path::new(dir);
    if let Err(e) = std::fs::create_dir_all(path) {
        eprintln!("Cannot create log directory {dir}: {e}, logging to stdout");
        return None;
    }
    Some(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_log_dir_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("logs").join("server");
        let nested_str = nested.to_str().unwrap();

        let prepared = prepare_log_dir(nested_str).unwrap();
        assert!(prepared.is_dir());
    }
}
