//! `followup ask`: one round-trip from the command line.

use std::io::{Write, stdout};

use anyhow::{Context, Result};
use followup_core::materializer::current_program;
use followup_core::{AskRequest, Config, ask_question};

/// Asks the question, prints the response JSON and returns the exit code:
/// 0 for an answer, 1 otherwise.
///
/// # Errors
/// Returns an error if the executable path is unknown or stdout fails.
pub async fn run(question: String, options: Vec<String>, config: &Config) -> Result<i32> {
    let program = current_program()?;
    tracing::debug!(timeout = %config.timeout, "asking from the command line");

    let outcome = ask_question(AskRequest::new(question, options), config, &program).await;

    let json = serde_json::to_string_pretty(&outcome.to_response_json())
        .context("serialize response")?;
    let mut out = stdout().lock();
    writeln!(out, "{json}").context("write response")?;
    out.flush().context("flush response")?;

    Ok(if outcome.is_success() { 0 } else { 1 })
}
