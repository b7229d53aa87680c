use clap::error::ErrorKind;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

mod answer;
mod codex;
mod config;
mod logging;
mod types;

use answer::Query;
use types::{AnswerOutput, Config, ErrorOutput, TextJoin};

#[derive(Parser)]
#[command(name = "codex-answer")]
#[command(about = "Print the latest Codex final answer for a project as JSON")]
#[command(version)]
struct Cli {
    /// Only consider sessions whose cwd matches this path (required)
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Skip the last N final answers (spans up to --max-sessions matching sessions, newest first)
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Session log root (default: $CODEX_HOME/sessions or ~/.codex/sessions)
    #[arg(long)]
    sessions_dir: Option<PathBuf>,

    /// How many matching sessions to collect answers from (default: 3)
    #[arg(long)]
    max_sessions: Option<usize>,

    /// How to assemble answers split across several output_text items
    #[arg(long, value_enum)]
    join: Option<TextJoin>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    // AIDEV-NOTE: Invocation errors use the same {"error": ...} stdout contract as lookup
    // errors, so callers only ever parse one shape. --help/--version still print normally.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => return finish(Err(clap_error_message(&e)), false),
    };

    let pretty = cli.pretty;
    let config = config::read_config();
    finish(run(cli, &config), pretty)
}

fn run(cli: Cli, config: &Config) -> Result<AnswerOutput, String> {
    let cwd = cli.cwd.ok_or_else(|| "--cwd is required".to_string())?;

    let sessions_dir = config::sessions_dir(cli.sessions_dir, config)?;
    let max_sessions = cli.max_sessions.unwrap_or(config.max_sessions);
    if max_sessions == 0 {
        return Err("--max-sessions must be at least 1".to_string());
    }

    let query = Query {
        offset: cli.offset,
        max_sessions,
        join: cli.join.unwrap_or(config.join),
        ..Query::new(sessions_dir, cwd)
    };
    logging::log(
        "main",
        &format!(
            "Looking up offset {} for {} in {}",
            query.offset,
            query.cwd.display(),
            query.sessions_dir.display()
        ),
    );

    answer::find_final_answer(&query)
        .map(AnswerOutput::from)
        .map_err(|e| e.to_string())
}

/// Print the single JSON document for this run and pick the exit code
fn finish(result: Result<AnswerOutput, String>, pretty: bool) -> ExitCode {
    if let Err(message) = &result {
        logging::log("main", message);
    }

    match render(&result, pretty) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize output: {}", e),
    }

    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn render(result: &Result<AnswerOutput, String>, pretty: bool) -> serde_json::Result<String> {
    match result {
        Ok(output) => to_json(output, pretty),
        Err(message) => to_json(
            &ErrorOutput {
                error: message.clone(),
            },
            pretty,
        ),
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// First line of a clap error, without the "error: " prefix
fn clap_error_message(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid arguments");
    first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["codex-answer", "--cwd", "/proj"]).unwrap();
        assert_eq!(cli.cwd, Some(PathBuf::from("/proj")));
        assert_eq!(cli.offset, 0);
        assert_eq!(cli.max_sessions, None);
        assert_eq!(cli.join, None);
        assert!(!cli.pretty);
    }

    #[test]
    fn test_cli_all_flags() {
        let cli = Cli::try_parse_from([
            "codex-answer",
            "--cwd",
            "/proj",
            "--offset",
            "2",
            "--sessions-dir",
            "/tmp/s",
            "--max-sessions",
            "5",
            "--join",
            "lines",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(cli.offset, 2);
        assert_eq!(cli.sessions_dir, Some(PathBuf::from("/tmp/s")));
        assert_eq!(cli.max_sessions, Some(5));
        assert_eq!(cli.join, Some(TextJoin::Lines));
        assert!(cli.pretty);
    }

    #[test]
    fn test_missing_cwd_is_structured_error() {
        let cli = Cli::try_parse_from(["codex-answer"]).unwrap();
        let err = run(cli, &Config::default()).unwrap_err();
        assert_eq!(err, "--cwd is required");
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let err = Cli::try_parse_from(["codex-answer", "--cwd", "/p", "--offset", "abc"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        let message = clap_error_message(&err);
        assert!(!message.starts_with("error:"));
        assert!(message.contains("abc"));
    }

    #[test]
    fn test_negative_offset_rejected() {
        assert!(Cli::try_parse_from(["codex-answer", "--cwd", "/p", "--offset", "-1"]).is_err());
    }

    #[test]
    fn test_zero_max_sessions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from([
            "codex-answer",
            "--cwd",
            "/p",
            "--max-sessions",
            "0",
            "--sessions-dir",
            root.as_str(),
        ])
        .unwrap();
        assert_eq!(run(cli, &Config::default()).unwrap_err(), "--max-sessions must be at least 1");
    }

    #[test]
    fn test_run_reports_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let root = missing.to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["codex-answer", "--cwd", "/p", "--sessions-dir", root.as_str()])
            .unwrap();
        assert_eq!(
            run(cli, &Config::default()).unwrap_err(),
            format!("Codex sessions directory not found: {}", missing.display())
        );
    }

    #[test]
    fn test_run_uses_given_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            sessions_dir: Some(dir.path().join("from-config")),
            ..Config::default()
        };
        let cli = Cli::try_parse_from(["codex-answer", "--cwd", "/p"]).unwrap();
        assert_eq!(
            run(cli, &config).unwrap_err(),
            format!(
                "Codex sessions directory not found: {}",
                dir.path().join("from-config").display()
            )
        );
    }

    #[test]
    fn test_every_outcome_renders_one_json_document() {
        let error: serde_json::Value =
            serde_json::from_str(&render(&Err("--cwd is required".to_string()), false).unwrap()).unwrap();
        assert_eq!(error, serde_json::json!({"error": "--cwd is required"}));

        let output = AnswerOutput {
            source_file: "/s/a.jsonl".to_string(),
            total_final_answers: 1,
            selected_index: 0,
            timestamp: "t".to_string(),
            text: "done".to_string(),
        };
        let success: serde_json::Value =
            serde_json::from_str(&render(&Ok(output), true).unwrap()).unwrap();
        assert_eq!(success["text"], "done");
        assert_eq!(success["total_final_answers"], 1);
    }
}
