//! Codex transcript reader
//!
//! Line-level parsing shared by the session matcher and the answer extractor,
//! plus final answer extraction from a single session file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::codex::types::CodexEntry;
use crate::logging;
use crate::types::TextJoin;

/// Error type for Codex transcript reading
#[derive(Debug)]
pub enum CodexReadError {
    IoError(std::io::Error),
}

impl std::fmt::Display for CodexReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodexReadError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for CodexReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodexReadError::IoError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CodexReadError {
    fn from(e: std::io::Error) -> Self {
        CodexReadError::IoError(e)
    }
}

/// Outcome of parsing one JSONL line
#[derive(Debug)]
pub enum LineOutcome {
    Record(CodexEntry),
    Skip(SkipReason),
}

/// Why a line produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Malformed(String),
}

/// Parse a single raw line
///
/// Never fails: anything that is not a JSON object becomes a skip.
/// Invalid UTF-8 lands here as malformed too, since parsing works on bytes.
pub fn parse_line(line: &[u8]) -> LineOutcome {
    if line.iter().all(u8::is_ascii_whitespace) {
        return LineOutcome::Skip(SkipReason::Blank);
    }

    match serde_json::from_slice::<CodexEntry>(line) {
        Ok(entry) => LineOutcome::Record(entry),
        Err(e) => LineOutcome::Skip(SkipReason::Malformed(e.to_string())),
    }
}

/// Iterator over the parsed lines of a session file, numbered from 1
pub struct SessionLines<R> {
    inner: std::io::Split<R>,
    line_num: usize,
}

impl<R: BufRead> Iterator for SessionLines<R> {
    type Item = std::io::Result<(usize, LineOutcome)>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.inner.next()?;
        self.line_num += 1;
        Some(raw.map(|bytes| (self.line_num, parse_line(&bytes))))
    }
}

/// Split a reader into parsed lines
pub fn session_lines<R: BufRead>(reader: R) -> SessionLines<R> {
    SessionLines {
        inner: reader.split(b'\n'),
        line_num: 0,
    }
}

/// Open a session file for line-by-line parsing
pub fn open_session(path: &Path) -> Result<SessionLines<BufReader<File>>, CodexReadError> {
    let file = File::open(path)?;
    Ok(session_lines(BufReader::new(file)))
}

/// A final answer found in a session file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalAnswer {
    pub text: String,
    /// Timestamp of the enclosing entry ("" when the entry had none)
    pub timestamp: String,
    pub source_file: PathBuf,
}

/// Read every final answer in a session file, oldest first (file order)
///
/// Skips malformed lines rather than failing entirely (graceful failure).
pub fn read_final_answers(path: &Path, join: TextJoin) -> Result<Vec<FinalAnswer>, CodexReadError> {
    let mut answers = Vec::new();

    for line in open_session(path)? {
        let (line_num, outcome) = line?;
        let entry = match outcome {
            LineOutcome::Record(entry) => entry,
            LineOutcome::Skip(SkipReason::Blank) => continue,
            LineOutcome::Skip(SkipReason::Malformed(reason)) => {
                logging::log(
                    "reader",
                    &format!("Skipping malformed line {} in {}: {}", line_num, path.display(), reason),
                );
                continue;
            }
        };

        if let Some(text) = entry.final_answer_text(join) {
            answers.push(FinalAnswer {
                text,
                timestamp: entry.timestamp,
                source_file: path.to_path_buf(),
            });
        }
    }

    Ok(answers)
}
