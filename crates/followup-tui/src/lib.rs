//! Terminal prompt for follow-up questions.
//!
//! Shows a question, a list of options and a free-text field, and resolves
//! to the chosen text or a cancellation.

pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod text_buffer;
pub mod update;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
pub use runtime::PromptRuntime;
pub use state::{InputMode, PromptAction, PromptOutcome, PromptSession};

/// Runs the interactive prompt on the current terminal.
///
/// # Errors
/// Returns an error if stdout is not a terminal or the terminal cannot be
/// prepared. Failures after the prompt started resolve to
/// [`PromptOutcome::Cancelled`] instead.
pub fn run_prompt(question: &str, options: Vec<String>) -> Result<PromptOutcome> {
    if !stdout().is_terminal() {
        anyhow::bail!("The follow-up prompt requires a terminal.");
    }

    let mut runtime = PromptRuntime::new(PromptSession::new(question, options))?;
    let outcome = runtime.run();
    drop(runtime);
    Ok(outcome)
}
