//! `followup prompt`: the process running inside the launched terminal.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::Result;
use followup_core::{PromptPayload, ResultArtifact};

/// Runs the prompt and records its result at `output`.
///
/// Every failure of the prompt itself ends up in the answer file as
/// `{"error": ...}`; only a failure to write that file is an error here.
///
/// # Errors
/// Returns an error if the answer file cannot be written.
pub fn run(output: &Path, payload_file: &Path) -> Result<()> {
    let artifact = match PromptPayload::read(payload_file) {
        Ok(payload) => prompt_artifact(payload),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "invalid prompt payload");
            ResultArtifact::error(format!("{e:#}"))
        }
    };

    artifact.write_atomic(output)?;
    tracing::info!(path = %output.display(), "wrote prompt response");
    Ok(())
}

fn prompt_artifact(payload: PromptPayload) -> ResultArtifact {
    let PromptPayload { question, options } = payload;
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        followup_tui::run_prompt(&question, options)
    }));

    match result {
        Ok(Ok(outcome)) => match outcome.into_answer() {
            Some(answer) => ResultArtifact::answered(answer),
            None => ResultArtifact::cancelled(),
        },
        Ok(Err(e)) => {
            tracing::error!(error = %format!("{e:#}"), "prompt failed");
            ResultArtifact::error(format!("{e:#}"))
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(%message, "prompt panicked");
            ResultArtifact::error(format!("prompt panicked: {message}"))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
