//! Codex session discovery
//!
//! Discovers Codex sessions stored under ~/.codex/sessions/ (normally YYYY/MM/DD/rollout-*.jsonl).
//! Codex sessions embed the cwd in session_meta, so we need to read each file to filter by project.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use crate::codex::reader::{open_session, LineOutcome};
use crate::logging;

/// A session log file on disk
#[derive(Debug, Clone)]
pub struct SessionFile {
    /// Full path to the session JSONL file
    pub path: PathBuf,

    /// Last modification time
    pub modified_at: DateTime<Utc>,
}

/// Get the default Codex sessions root
///
/// Honors CODEX_HOME like the Codex CLI does, otherwise ~/.codex/sessions/
pub fn codex_sessions_dir() -> Option<PathBuf> {
    if let Some(codex_home) = std::env::var_os("CODEX_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(codex_home).join("sessions"));
    }
    dirs::home_dir().map(|home| home.join(".codex").join("sessions"))
}

/// List every .jsonl file below `root`, newest first
///
/// Each file appears once, under its path inside `root`, even when symlinked
/// directories (aliases or loops) make the glob reach it several ways.
/// Files whose metadata cannot be read are left out. Ties keep glob (path) order.
pub fn list_session_files(root: &Path) -> Result<Vec<SessionFile>, String> {
    let root_str = root
        .to_str()
        .ok_or_else(|| format!("Session directory is not valid UTF-8: {}", root.display()))?;
    let escaped_root = glob::Pattern::escape(root_str);
    let pattern = format!("{}/**/*.jsonl", escaped_root.trim_end_matches('/'));

    let paths = glob::glob(&pattern).map_err(|e| format!("Invalid session glob {}: {}", pattern, e))?;
    let canonical_root = root
        .canonicalize()
        .map_err(|e| format!("Failed to resolve {}: {}", root.display(), e))?;

    let mut seen = HashSet::new();
    let mut sessions = Vec::new();

    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                logging::log("session", &format!("Skipping unreadable path: {}", e));
                continue;
            }
        };

        let Ok(real_path) = path.canonicalize() else {
            continue;
        };
        if !seen.insert(real_path.clone()) {
            continue;
        }

        let Ok(metadata) = std::fs::metadata(&real_path) else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Some(modified_at) = metadata.modified().ok().and_then(system_time_to_datetime) else {
            continue;
        };

        // Report the direct path, not whichever alias the glob hit first
        let path = match real_path.strip_prefix(&canonical_root) {
            Ok(relative) => root.join(relative),
            Err(_) => path,
        };
        sessions.push(SessionFile { path, modified_at });
    }

    // Sort by modification time, newest first
    sessions.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));

    Ok(sessions)
}

/// Read the cwd from the first session_meta entry
///
/// Stops at the first session_meta. Returns None if there is none or the file can't be read.
pub fn read_session_cwd(path: &Path) -> Option<String> {
    for line in open_session(path).ok()? {
        let (_, outcome) = line.ok()?;
        if let LineOutcome::Record(entry) = outcome {
            if entry.is_session_meta() {
                return entry.session_cwd().map(|s| s.to_string());
            }
        }
    }

    None
}

/// Check whether a session's recorded cwd is the target directory
///
/// Both sides are resolved first, so symlinks and trailing separators don't matter.
pub fn cwd_matches(session_cwd: Option<&str>, target: &Path) -> bool {
    match session_cwd {
        Some(cwd) => resolve_path(Path::new(cwd)) == resolve_path(target),
        None => false,
    }
}

/// Resolve a path to its canonical absolute form
///
/// Paths that don't exist (fully or partly) are resolved as far as they do exist:
/// the deepest existing ancestor is canonicalized and the rest appended lexically.
pub fn resolve_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    if let Ok(canonical) = absolute.canonicalize() {
        return canonical;
    }

    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    let mut resolved = loop {
        match existing.parent() {
            Some(parent) => {
                if let Some(name) = existing.file_name() {
                    rest.push(Component::Normal(name));
                } else if existing.ends_with("..") {
                    rest.push(Component::ParentDir);
                }
                existing = parent;
                if let Ok(canonical) = existing.canonicalize() {
                    break canonical;
                }
            }
            None => break existing.to_path_buf(),
        }
    };

    for component in rest.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }

    resolved
}

/// Convert SystemTime to DateTime<Utc>
fn system_time_to_datetime(st: SystemTime) -> Option<DateTime<Utc>> {
    let duration = st.duration_since(std::time::UNIX_EPOCH).ok()?;
    DateTime::from_timestamp(duration.as_secs() as i64, duration.subsec_nanos())
}
