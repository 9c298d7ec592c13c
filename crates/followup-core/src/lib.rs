//! Core of the follow-up question round-trip.
//!
//! A question is materialized into a small script, launched in a new
//! user-visible terminal, and answered through a single JSON file that the
//! prompt process writes once. The asking side only ever observes that file
//! and the liveness of the process it launched.
//!
//! Control flow: [`ask::ask_with`] → [`launcher::Launcher`] →
//! [`materializer`] → (new process) prompt UI → [`artifact`] →
//! [`collector::collect`].

pub mod artifact;
pub mod ask;
pub mod collector;
pub mod config;
pub mod launcher;
pub mod materializer;
pub mod outcome;

pub use artifact::ResultArtifact;
pub use ask::{AskRequest, DEFAULT_OPTIONS, ask_question, ask_with};
pub use config::{Config, PollTimings, TimeoutPolicy};
pub use launcher::{LaunchHandle, Launcher};
pub use materializer::PromptPayload;
pub use outcome::Outcome;
