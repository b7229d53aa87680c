//! Configuration - config.toml I/O and session root resolution

use crate::codex::session::codex_sessions_dir;
use crate::logging;
use crate::types::Config;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "codex-answer";
const CONFIG_FILE: &str = "config.toml";

/// Get the config file path (<config_dir>/codex-answer/config.toml)
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Read user config, returns default if not found
pub fn read_config() -> Config {
    match config_path() {
        Some(path) => read_config_from(&path),
        None => Config::default(),
    }
}

/// Read config from a specific file, returns default if missing or invalid
pub fn read_config_from(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            logging::log("config", &format!("Ignoring invalid {}: {}", path.display(), e));
            Config::default()
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            logging::log("config", &format!("Failed to read {}: {}", path.display(), e));
            Config::default()
        }
    }
}

/// Pick the session root: explicit flag, then config, then CODEX_HOME / home default
pub fn sessions_dir(explicit: Option<PathBuf>, config: &Config) -> Result<PathBuf, String> {
    explicit
        .or_else(|| config.sessions_dir.clone())
        .or_else(codex_sessions_dir)
        .ok_or_else(|| "Could not determine Codex sessions directory".to_string())
}
