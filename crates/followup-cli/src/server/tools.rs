//! Arguments and results of the follow-up tools.

use followup_core::{AskRequest, Outcome};
use rmcp::schemars;
use serde::Deserialize;
use serde_json::json;

pub const ASK_FOLLOWUP_QUESTION: &str = "ask_followup_question";
pub const CONFIRM_COMPLETION: &str = "confirm_completion";

/// Options offered after a task is reported complete.
pub const COMPLETION_OPTIONS: [&str; 4] = [
    "This looks perfect - finish",
    "Make some changes",
    "Add more features",
    "Start over with a different approach",
];

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AskArgs {
    /// The question to ask the user
    pub question: String,
    /// Answers to offer; defaults are used when empty
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConfirmArgs {
    /// Summary of what was completed
    pub task_summary: String,
}

impl From<AskArgs> for AskRequest {
    fn from(args: AskArgs) -> Self {
        AskRequest::new(args.question, args.options)
    }
}

impl From<ConfirmArgs> for AskRequest {
    fn from(args: ConfirmArgs) -> Self {
        AskRequest::new(
            completion_question(&args.task_summary),
            COMPLETION_OPTIONS.iter().map(|o| (*o).to_string()).collect(),
        )
    }
}

pub fn completion_question(summary: &str) -> String {
    format!("I've completed the following:\n\n{summary}\n\nWhat would you like to do?")
}

/// Text block returned for a finished round-trip.
pub fn outcome_text(outcome: &Outcome) -> String {
    serde_json::to_string_pretty(&outcome.to_response_json())
        .unwrap_or_else(|e| json!({ "status": "error", "error": e.to_string() }).to_string())
}
