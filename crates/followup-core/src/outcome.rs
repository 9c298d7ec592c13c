//! Terminal classification of one question/answer round-trip.

use std::fmt;

use serde_json::{Value, json};

/// How a follow-up question ended.
///
/// Every failure mode of the round-trip is folded into one of these variants;
/// none of them is an unhandled fault for the asking process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The user picked an option or submitted custom text.
    Success(String),
    /// The user explicitly cancelled the prompt.
    Cancelled,
    /// The prompt process ended without leaving an answer behind.
    ClosedWithoutResponse,
    /// The timeout elapsed while the prompt was still open.
    TimedOut,
    /// No terminal mechanism could be started.
    LaunchFailed(String),
    /// The prompt process reported an internal failure.
    EngineError(String),
    /// The answer file exists but could not be understood.
    ParseError(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns the answer text for [`Outcome::Success`].
    pub fn answer(&self) -> Option<&str> {
        match self {
            Outcome::Success(text) => Some(text),
            _ => None,
        }
    }

    /// Short machine-readable status used in the response JSON.
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Cancelled => "cancelled",
            Outcome::ClosedWithoutResponse => "closed",
            Outcome::TimedOut => "timeout",
            Outcome::LaunchFailed(_) | Outcome::EngineError(_) | Outcome::ParseError(_) => "error",
        }
    }

    /// Renders the caller-facing JSON object for this outcome.
    pub fn to_response_json(&self) -> Value {
        match self {
            Outcome::Success(text) => json!({
                "status": self.status(),
                "user_response": text,
                "message": format!("User selected: {text}"),
            }),
            Outcome::Cancelled => json!({
                "status": self.status(),
                "message": "User cancelled the follow-up question",
            }),
            Outcome::ClosedWithoutResponse => json!({
                "status": self.status(),
                "message": "The prompt window was closed without a response",
            }),
            Outcome::TimedOut => json!({
                "status": self.status(),
                "error": "Timeout waiting for user response",
                "message": "No response received within the configured timeout. Please try again.",
            }),
            Outcome::LaunchFailed(reason) => json!({
                "status": self.status(),
                "error": "Failed to launch terminal. Please ensure you have terminal access.",
                "detail": reason,
                "fallback_message": "Unable to get user input. Assuming 'Continue' as default response.",
            }),
            Outcome::EngineError(message) => json!({
                "status": self.status(),
                "error": message,
                "message": "The prompt failed before an answer was recorded",
            }),
            Outcome::ParseError(detail) => json!({
                "status": self.status(),
                "error": format!("Failed to parse response: {detail}"),
                "message": "Invalid response format",
            }),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(text) => write!(f, "answered: {text}"),
            Outcome::Cancelled => write!(f, "cancelled by user"),
            Outcome::ClosedWithoutResponse => write!(f, "closed without response"),
            Outcome::TimedOut => write!(f, "timed out"),
            Outcome::LaunchFailed(reason) => write!(f, "launch failed: {reason}"),
            Outcome::EngineError(message) => write!(f, "prompt error: {message}"),
            Outcome::ParseError(detail) => write!(f, "unreadable response: {detail}"),
        }
    }
}
