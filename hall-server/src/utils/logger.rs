//! Logging Infrastructure
//!
//! Structured logging for development (pretty, stdout) and production
//! (optional JSON, daily rolling file when a log directory is configured).

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with stdout output only
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` overrides `log_level` when set.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir exists
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "hall-server");
            let builder = builder.with_ansi(false).with_writer(file_appender);
            if json {
                builder.json().init();
            } else {
                builder.init();
            }
            return;
        }
    }

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
