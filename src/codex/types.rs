//! Codex session entry types
//!
//! Codex sessions are JSONL files. Two entry types matter here:
//! - session_meta: Session metadata (id, cwd, cli_version)
//! - response_item: Response content; final answers carry `phase: "final_answer"`
//!
//! Everything else (event_msg, turn_context, unknown types) parses fine and is ignored.

use serde::{Deserialize, Serialize};

use crate::types::TextJoin;

const SESSION_META: &str = "session_meta";
const RESPONSE_ITEM: &str = "response_item";
const FINAL_ANSWER_PHASE: &str = "final_answer";
const OUTPUT_TEXT: &str = "output_text";

/// A single entry in the Codex transcript JSONL file
///
/// All fields default so that any JSON object parses; shape checks happen in the accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodexEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type", default)]
    pub entry_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CodexEntry {
    /// Check if this is a session metadata entry
    pub fn is_session_meta(&self) -> bool {
        self.entry_type == SESSION_META
    }

    /// Check if this is a response item
    pub fn is_response_item(&self) -> bool {
        self.entry_type == RESPONSE_ITEM
    }

    /// Get the working directory from session_meta
    pub fn session_cwd(&self) -> Option<&str> {
        if self.is_session_meta() {
            self.payload.get("cwd").and_then(|v| v.as_str())
        } else {
            None
        }
    }

    /// Check if this is a response item in the final_answer phase
    pub fn is_final_answer(&self) -> bool {
        self.is_response_item()
            && self.payload.get("phase").and_then(|v| v.as_str()) == Some(FINAL_ANSWER_PHASE)
    }

    /// Text of every `output_text` content item, in order
    ///
    /// Items without a string `text` are not counted as output text.
    pub fn output_texts(&self) -> Vec<&str> {
        self.payload
            .get("content")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.get("type").and_then(|t| t.as_str()) == Some(OUTPUT_TEXT))
                    .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Final answer text for this entry, assembled with the given join strategy
    ///
    /// None unless this is a final_answer response item with at least one output_text item.
    pub fn final_answer_text(&self, join: TextJoin) -> Option<String> {
        if !self.is_final_answer() {
            return None;
        }

        let texts = self.output_texts();
        if texts.is_empty() {
            return None;
        }

        match join {
            TextJoin::First => Some(texts[0].to_string()),
            TextJoin::Concat => Some(texts.concat()),
            TextJoin::Lines => Some(texts.join("\n")),
        }
    }
}
