//! Waits for the answer file and classifies the round-trip.

use std::fs;
use std::path::Path;

use tokio::time::{Instant, sleep};

use crate::artifact::{ArtifactError, ResultArtifact};
use crate::config::{PollTimings, TimeoutPolicy};
use crate::launcher::LaunchHandle;
use crate::outcome::Outcome;

/// Polls for `artifact` until an answer arrives, the session goes away or
/// the timeout elapses.
///
/// Liveness is only consulted after `timings.startup_grace`, since a fresh
/// terminal may not have started the prompt yet. A session that ended without
/// an answer gets one more `timings.exit_grace` for a late write. On timeout
/// the session is asked to terminate, once.
pub async fn collect(
    handle: &mut LaunchHandle,
    artifact: &Path,
    policy: TimeoutPolicy,
    timings: &PollTimings,
) -> Outcome {
    let started = Instant::now();
    tracing::debug!(path = %artifact.display(), timeout = %policy, "waiting for response");

    loop {
        if artifact.exists() {
            return consume(artifact);
        }

        let elapsed = started.elapsed();
        let session_ended = elapsed >= timings.startup_grace && !handle.is_alive();

        if session_ended {
            return closed_or_late(artifact, timings).await;
        }

        if policy.is_expired(elapsed) {
            // Liveness may not have been checked yet during the startup grace.
            if !handle.is_alive() {
                return closed_or_late(artifact, timings).await;
            }
            tracing::info!(timeout = %policy, "no response before timeout; closing prompt");
            if let Err(e) = handle.terminate() {
                tracing::warn!(error = %e, "failed to terminate prompt session");
            }
            return Outcome::TimedOut;
        }

        sleep(timings.interval).await;
    }
}

async fn closed_or_late(artifact: &Path, timings: &PollTimings) -> Outcome {
    sleep(timings.exit_grace).await;
    if artifact.exists() {
        return consume(artifact);
    }
    tracing::info!("prompt session ended without a response");
    Outcome::ClosedWithoutResponse
}

/// Reads and classifies the answer file. The file is removed once parsed and
/// kept when it cannot be understood.
fn consume(artifact: &Path) -> Outcome {
    let parsed = match ResultArtifact::read(artifact) {
        Ok(parsed) => parsed,
        Err(ArtifactError::Io(e)) => {
            tracing::warn!(path = %artifact.display(), error = %e, "response file unreadable");
            return Outcome::ParseError(e.to_string());
        }
        Err(ArtifactError::Malformed(detail)) => {
            tracing::warn!(path = %artifact.display(), %detail, "response file malformed; keeping it");
            return Outcome::ParseError(detail);
        }
    };

    if let Err(e) = fs::remove_file(artifact) {
        tracing::debug!(error = %e, "could not remove response file");
    }

    match parsed {
        ResultArtifact::Error { error } => Outcome::EngineError(error),
        ResultArtifact::Answer { result: None } => Outcome::Cancelled,
        ResultArtifact::Answer { result: Some(text) } => Outcome::Success(text),
    }
}
