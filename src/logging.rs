//! Debug log - append-only trace of what a run looked at
//!
//! stdout carries the JSON result and nothing else, so diagnostics go to the file
//! named by CODEX_ANSWER_LOG. Without it, logging is a no-op.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const LOG_ENV: &str = "CODEX_ANSWER_LOG";

/// Log a message to the debug log file
pub fn log(context: &str, message: &str) {
    let Some(path) = log_path() else {
        return;
    };
    let timestamp = Local::now().format("%H:%M:%S");
    let line = format!("[{}] [{}] {}\n", timestamp, context, message);

    // Append to log file, ignore errors (logging should never fail the operation)
    let _ = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut f| f.write_all(line.as_bytes()));
}

fn log_path() -> Option<PathBuf> {
    std::env::var_os(LOG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
