//! Codex session parsing module
//!
//! Discovers OpenAI Codex CLI sessions stored in ~/.codex/sessions/ and
//! reads final answers out of them.

pub mod reader;
pub mod session;
pub mod types;
