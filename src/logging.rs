//! Logging bootstrap for hosts embedding the view-model.

use macro_tree_core::LogConfig;
use rolling_logger::{LoggerError, LoggerOptions};

/// Install the rolling file logger described by `config`. Call once at start-up.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggerError> {
    rolling_logger::init_logger_with(&config.dir, &config.app_name, &logger_options(config))
}

fn logger_options(config: &LogConfig) -> LoggerOptions {
    LoggerOptions {
        max_file_bytes: config.max_file_bytes,
        max_files: config.max_files,
        buffer_capacity: config.buffer_capacity,
        level: config.level.clone(),
    }
}

/// Recent log lines for an error dialog
pub fn recent_log_lines() -> Vec<String> {
    rolling_logger::recent_lines()
}
