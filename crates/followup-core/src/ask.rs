//! One complete question/answer round-trip.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use std::{env, fs, process};

use tokio::task;

use crate::collector;
use crate::config::Config;
use crate::launcher::{HostEnv, LaunchRequest, Launcher};
use crate::materializer::PromptPayload;
use crate::outcome::Outcome;

/// Options offered when the caller supplies none.
pub const DEFAULT_OPTIONS: [&str; 3] = ["Continue", "Make changes", "Finish"];

static ARTIFACT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A question ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
    pub options: Vec<String>,
}

impl AskRequest {
    /// Builds a request, substituting [`DEFAULT_OPTIONS`] for an empty list.
    pub fn new(question: impl Into<String>, options: Vec<String>) -> Self {
        let options = if options.is_empty() {
            DEFAULT_OPTIONS.iter().map(|o| (*o).to_string()).collect()
        } else {
            options
        };
        Self {
            question: question.into(),
            options,
        }
    }

    /// Builds a request that keeps an empty option list, leaving only the
    /// free-text field.
    pub fn free_text(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            options: Vec::new(),
        }
    }
}

/// Asks the user through a new terminal and waits for the outcome.
///
/// `program` is the `followup` executable that hosts the prompt. Never fails:
/// every problem is reported as an [`Outcome`].
pub async fn ask_question(request: AskRequest, config: &Config, program: &Path) -> Outcome {
    ask_with(&Launcher::detect(), request, config, program).await
}

/// Same as [`ask_question`] with an explicit strategy table.
pub async fn ask_with(
    launcher: &Launcher,
    request: AskRequest,
    config: &Config,
    program: &Path,
) -> Outcome {
    let output = unique_artifact_path(&env::temp_dir());
    if output.exists() {
        let _ = fs::remove_file(&output);
    }

    let launch_request = LaunchRequest {
        program: program.to_path_buf(),
        payload: PromptPayload::new(request.question, request.options),
        output: output.clone(),
        close_terminal: config.close_terminal,
        preferred_terminal: config.terminal.clone(),
        env: HostEnv::from_process(),
    };

    let launcher = launcher.clone();
    let launched = task::spawn_blocking(move || launcher.launch(&launch_request)).await;

    let mut handle = match launched {
        Ok(Ok(handle)) => handle,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "could not open a terminal for the question");
            return Outcome::LaunchFailed(e.to_string());
        }
        Err(e) => {
            tracing::warn!(error = %e, "launch task failed");
            return Outcome::LaunchFailed(format!("launch task failed: {e}"));
        }
    };

    tracing::info!(strategy = handle.strategy(), "waiting for the user to answer");
    let outcome = collector::collect(&mut handle, &output, config.timeout, &config.poll).await;
    tracing::info!(%outcome, "follow-up question finished");

    // Dropping the handle removes the generated script.
    drop(handle);
    outcome
}

/// Answer file path unique per process, time and call.
pub fn unique_artifact_path(dir: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let seq = ARTIFACT_COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!(
        "followup_output_{}_{nanos}_{seq}.json",
        process::id()
    ))
}
