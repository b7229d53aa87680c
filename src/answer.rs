//! Final answer selection across matching sessions
//!
//! Walks session files newest-first, keeps those whose cwd matches the target,
//! and builds a newest-first list of final answers from up to `max_sessions` of them.
//!
//! AIDEV-NOTE: Ordering is two-level: session recency by file mtime, then record order
//! within a session. It is not a global timestamp sort. If session files are touched,
//! copied or restored, session order can differ from true answer chronology.

use std::path::{Path, PathBuf};

use crate::codex::reader::{read_final_answers, CodexReadError, FinalAnswer};
use crate::codex::session::{cwd_matches, list_session_files, read_session_cwd};
use crate::logging;
use crate::types::{AnswerOutput, TextJoin, DEFAULT_MAX_SESSIONS};

/// What to look for
#[derive(Debug, Clone)]
pub struct Query {
    /// Root directory holding the session JSONL files
    pub sessions_dir: PathBuf,

    /// Only sessions that ran in this directory are considered
    pub cwd: PathBuf,

    /// 0 = most recent final answer, 1 = the one before, ...
    pub offset: usize,

    /// Stop after this many matching sessions
    pub max_sessions: usize,

    pub join: TextJoin,
}

impl Query {
    pub fn new(sessions_dir: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
            cwd: cwd.into(),
            offset: 0,
            max_sessions: DEFAULT_MAX_SESSIONS,
            join: TextJoin::default(),
        }
    }
}

/// The selected final answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAnswer {
    pub source_file: PathBuf,
    pub total_final_answers: usize,
    pub selected_index: usize,
    pub timestamp: String,
    pub text: String,
}

impl From<SelectedAnswer> for AnswerOutput {
    fn from(answer: SelectedAnswer) -> Self {
        Self {
            source_file: answer.source_file.display().to_string(),
            total_final_answers: answer.total_final_answers,
            selected_index: answer.selected_index,
            timestamp: answer.timestamp,
            text: answer.text,
        }
    }
}

/// Why no answer could be selected
#[derive(Debug)]
pub enum AnswerError {
    RootNotFound(PathBuf),
    NoFilesFound,
    SessionList { root: PathBuf, message: String },
    NoSessionMatch { cwd: PathBuf },
    NoAnswersFound { cwd: PathBuf, matched: usize },
    OffsetOutOfRange { total: usize, matched: usize, offset: usize },
    SessionRead { path: PathBuf, source: CodexReadError },
}

impl std::fmt::Display for AnswerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerError::RootNotFound(root) => {
                write!(f, "Codex sessions directory not found: {}", root.display())
            }
            AnswerError::NoFilesFound => write!(f, "No .jsonl files found in Codex sessions"),
            AnswerError::SessionList { root, message } => write!(
                f,
                "Failed to list Codex sessions in {}: {}",
                root.display(),
                message
            ),
            AnswerError::NoSessionMatch { cwd } => {
                write!(f, "No Codex sessions found with cwd: {}", cwd.display())
            }
            AnswerError::NoAnswersFound { cwd, matched } => write!(
                f,
                "No final_answer found in the last {} matching session(s) for cwd: {}",
                matched,
                cwd.display()
            ),
            AnswerError::OffsetOutOfRange { total, matched, offset } => write!(
                f,
                "Only {} final_answers across {} session(s), offset {} is too large",
                total, matched, offset
            ),
            AnswerError::SessionRead { path, source } => {
                write!(f, "Failed to read session {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for AnswerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnswerError::SessionRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Find the final answer at `query.offset` in the newest-first list
pub fn find_final_answer(query: &Query) -> Result<SelectedAnswer, AnswerError> {
    let root = &query.sessions_dir;
    if !root.exists() {
        return Err(AnswerError::RootNotFound(root.clone()));
    }

    let files = list_session_files(root).map_err(|message| AnswerError::SessionList {
        root: root.clone(),
        message,
    })?;
    if files.is_empty() {
        return Err(AnswerError::NoFilesFound);
    }

    let (answers, matched) = collect_answers(
        files.iter().map(|f| f.path.as_path()),
        &query.cwd,
        query.max_sessions,
        query.join,
    )?;

    if matched == 0 {
        return Err(AnswerError::NoSessionMatch {
            cwd: query.cwd.clone(),
        });
    }

    if answers.is_empty() {
        return Err(AnswerError::NoAnswersFound {
            cwd: query.cwd.clone(),
            matched,
        });
    }

    let total = answers.len();
    let answer = answers
        .into_iter()
        .nth(query.offset)
        .ok_or(AnswerError::OffsetOutOfRange {
            total,
            matched,
            offset: query.offset,
        })?;

    logging::log(
        "answer",
        &format!(
            "Selected answer {} of {} from {}",
            query.offset,
            total,
            answer.source_file.display()
        ),
    );

    Ok(SelectedAnswer {
        source_file: answer.source_file,
        total_final_answers: total,
        selected_index: query.offset,
        timestamp: answer.timestamp,
        text: answer.text,
    })
}

/// Merge final answers from the first `max_sessions` matching files
///
/// `files` must already be newest-first. Returns the newest-first answers
/// and how many sessions matched.
fn collect_answers<'a>(
    files: impl Iterator<Item = &'a Path>,
    cwd: &Path,
    max_sessions: usize,
    join: TextJoin,
) -> Result<(Vec<FinalAnswer>, usize), AnswerError> {
    let mut answers = Vec::new();
    let mut matched = 0;

    for path in files {
        let session_cwd = read_session_cwd(path);
        if !cwd_matches(session_cwd.as_deref(), cwd) {
            continue;
        }

        matched += 1;
        let session_answers = read_final_answers(path, join).map_err(|source| AnswerError::SessionRead {
            path: path.to_path_buf(),
            source,
        })?;
        logging::log(
            "answer",
            &format!(
                "Matched session {} ({} final answers)",
                path.display(),
                session_answers.len()
            ),
        );

        // Last answer in the session first
        answers.extend(session_answers.into_iter().rev());

        if matched >= max_sessions {
            break;
        }
    }

    Ok((answers, matched))
}
