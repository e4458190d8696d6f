//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::core::Config;

/// Initialize the logger from `LOG_LEVEL` / `LOG_FORMAT` / `LOG_DIR` settings
///
/// `RUST_LOG` takes precedence over `config.log_level` when set.
pub fn init_logger(config: &Config) {
    let level = &config.log_level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "catalog_server={level},tower_http={level},security={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = &config.log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, "catalog-server");
            let builder = builder.with_ansi(false).with_writer(file_appender);
            let result = if config.log_json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            if result.is_err() {
                eprintln!("Logger already initialized");
            }
            return;
        }
        eprintln!("Cannot create log directory {dir}, logging to stdout");
    }

    let result = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        eprintln!("Logger already initialized");
    }
}
