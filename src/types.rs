//! Core data types for codex-answer

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of matching sessions to collect answers from
pub const DEFAULT_MAX_SESSIONS: usize = 3;

/// How the text of a final answer is assembled from its output_text items
///
/// Codex currently writes one output_text item per final answer, so `First` is the default.
/// The other strategies cover logs that split one answer into several chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TextJoin {
    /// First output_text item only
    #[default]
    First,
    /// All output_text items, concatenated
    Concat,
    /// All output_text items, one per line
    Lines,
}

/// User-level configuration
/// Stored in <config_dir>/codex-answer/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Session log root (defaults to $CODEX_HOME/sessions or ~/.codex/sessions)
    #[serde(default)]
    pub sessions_dir: Option<PathBuf>,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    #[serde(default)]
    pub join: TextJoin,
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sessions_dir: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
            join: TextJoin::default(),
        }
    }
}

/// Success output printed to stdout
/// AIDEV-NOTE: Field order is part of the output contract; callers read these keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOutput {
    pub source_file: String,
    pub total_final_answers: usize,
    pub selected_index: usize,
    pub timestamp: String,
    pub text: String,
}

/// Failure output printed to stdout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.sessions_dir, None);
        assert_eq!(config.max_sessions, 3);
        assert_eq!(config.join, TextJoin::First);
    }

    #[test]
    fn test_config_from_toml() {
        let config: Config = toml::from_str(
            "sessions_dir = \"/tmp/sessions\"\nmax_sessions = 5\njoin = \"lines\"\n",
        )
        .unwrap();
        assert_eq!(config.sessions_dir, Some(PathBuf::from("/tmp/sessions")));
        assert_eq!(config.max_sessions, 5);
        assert_eq!(config.join, TextJoin::Lines);
    }

    #[test]
    fn test_answer_output_key_order() {
        let output = AnswerOutput {
            source_file: "/s/a.jsonl".to_string(),
            total_final_answers: 2,
            selected_index: 1,
            timestamp: "t".to_string(),
            text: "héllo".to_string(),
        };
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(
            json,
            r#"{"source_file":"/s/a.jsonl","total_final_answers":2,"selected_index":1,"timestamp":"t","text":"héllo"}"#
        );
    }
}
