//! Configuration for the follow-up round-trip.
//!
//! All settings come from the environment; there is no config file. Callers
//! that want different behavior (CLI flags, tests) adjust the loaded struct.

use std::{env, fmt};
use std::time::Duration;

use anyhow::{Context, Result};

/// Environment variable holding the response timeout in minutes.
pub const TIMEOUT_ENV: &str = "FOLLOWUP_TIMEOUT_MINUTES";
/// Environment variable controlling whether the spawned window closes itself.
pub const CLOSE_TERMINAL_ENV: &str = "FOLLOWUP_CLOSE_TERMINAL";
/// Environment variable naming a preferred terminal emulator binary.
pub const TERMINAL_ENV: &str = "FOLLOWUP_TERMINAL";

/// Timeout applied when the environment does not set one.
pub const DEFAULT_TIMEOUT_MINUTES: i64 = 5;
/// Upper bound for any bounded timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

const MAX_TIMEOUT_MINUTES: i64 = 24 * 60;

/// How long the collector waits for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Wait until the prompt process answers or goes away.
    Unbounded,
    /// Give up after this duration (never above [`MAX_TIMEOUT`]).
    Bounded(Duration),
}

impl TimeoutPolicy {
    /// Builds a policy from whole minutes.
    ///
    /// Anything below one minute means "no limit"; large values are clamped
    /// to 24 hours.
    pub fn from_minutes(minutes: i64) -> Self {
        if minutes < 1 {
            return TimeoutPolicy::Unbounded;
        }
        let minutes = minutes.min(MAX_TIMEOUT_MINUTES) as u64;
        TimeoutPolicy::Bounded(Duration::from_secs(minutes * 60))
    }

    /// Builds a bounded policy, clamped to [`MAX_TIMEOUT`].
    pub fn bounded(limit: Duration) -> Self {
        TimeoutPolicy::Bounded(limit.min(MAX_TIMEOUT))
    }

    pub fn limit(self) -> Option<Duration> {
        match self {
            TimeoutPolicy::Unbounded => None,
            TimeoutPolicy::Bounded(limit) => Some(limit),
        }
    }

    pub fn is_expired(self, elapsed: Duration) -> bool {
        self.limit().is_some_and(|limit| elapsed >= limit)
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        TimeoutPolicy::from_minutes(DEFAULT_TIMEOUT_MINUTES)
    }
}

impl fmt::Display for TimeoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutPolicy::Unbounded => write!(f, "no limit"),
            TimeoutPolicy::Bounded(limit) => {
                let secs = limit.as_secs();
                if secs >= 60 && secs % 60 == 0 {
                    write!(f, "{} min", secs / 60)
                } else {
                    write!(f, "{}ms", limit.as_millis())
                }
            }
        }
    }
}

/// Fixed cadence of the response collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimings {
    /// Delay between two checks for the answer file.
    pub interval: Duration,
    /// Time given to the new terminal before its liveness is trusted.
    pub startup_grace: Duration,
    /// Extra wait after the process ended, in case the file lands late.
    pub exit_grace: Duration,
}

impl Default for PollTimings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            startup_grace: Duration::from_secs(3),
            exit_grace: Duration::from_secs(1),
        }
    }
}

/// Settings for one follow-up round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub timeout: TimeoutPolicy,
    /// Close the spawned window when the prompt finishes instead of waiting
    /// for a keypress.
    pub close_terminal: bool,
    /// Terminal emulator binary to try first on Unix-like systems.
    pub terminal: Option<String>,
    pub poll: PollTimings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: TimeoutPolicy::default(),
            close_terminal: true,
            terminal: None,
            poll: PollTimings::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// Invalid values are logged and replaced by defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match parse_timeout_minutes(&raw) {
                Ok(policy) => config.timeout = policy,
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring invalid {TIMEOUT_ENV}");
                }
            }
        }

        if let Some(raw) = lookup(CLOSE_TERMINAL_ENV) {
            config.close_terminal = parse_flag(&raw);
        }

        config.terminal = lookup(TERMINAL_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        config
    }
}

/// Parses a timeout given in whole minutes.
///
/// # Errors
/// Returns an error if the value is not an integer.
pub fn parse_timeout_minutes(raw: &str) -> Result<TimeoutPolicy> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{raw}' is not a whole number of minutes"))?;
    Ok(TimeoutPolicy::from_minutes(minutes))
}

/// Interprets `true`, `1` and `yes` (any case) as true; everything else is false.
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.timeout, TimeoutPolicy::Bounded(Duration::from_secs(300)));
        assert!(config.close_terminal);
        assert!(config.terminal.is_none());
    }

    #[test]
    fn test_timeout_below_one_minute_is_unbounded() {
        assert_eq!(TimeoutPolicy::from_minutes(0), TimeoutPolicy::Unbounded);
        assert_eq!(TimeoutPolicy::from_minutes(-5), TimeoutPolicy::Unbounded);
    }

    #[test]
    fn test_timeout_clamped_to_a_day() {
        assert_eq!(TimeoutPolicy::from_minutes(i64::MAX), TimeoutPolicy::Bounded(MAX_TIMEOUT));
        assert_eq!(
            TimeoutPolicy::bounded(Duration::from_secs(100_000)),
            TimeoutPolicy::Bounded(MAX_TIMEOUT)
        );
    }

    #[test]
    fn test_env_values_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            (TIMEOUT_ENV, " 1 "),
            (CLOSE_TERMINAL_ENV, "No"),
            (TERMINAL_ENV, "kitty"),
        ]));
        assert_eq!(config.timeout, TimeoutPolicy::Bounded(Duration::from_secs(60)));
        assert!(!config.close_terminal);
        assert_eq!(config.terminal.as_deref(), Some("kitty"));
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let config = Config::from_lookup(lookup_from(&[(TIMEOUT_ENV, "soon")]));
        assert_eq!(config.timeout, TimeoutPolicy::default());
    }

    #[test]
    fn test_blank_terminal_is_ignored() {
        let config = Config::from_lookup(lookup_from(&[(TERMINAL_ENV, "   ")]));
        assert!(config.terminal.is_none());
    }

    #[test]
    fn test_parse_flag_accepts_common_truthy_values() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("off"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_is_expired() {
        let policy = TimeoutPolicy::bounded(Duration::from_secs(1));
        assert!(!policy.is_expired(Duration::from_millis(999)));
        assert!(policy.is_expired(Duration::from_secs(1)));
        assert!(!TimeoutPolicy::Unbounded.is_expired(Duration::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeoutPolicy::from_minutes(5).to_string(), "5 min");
        assert_eq!(TimeoutPolicy::Unbounded.to_string(), "no limit");
    }
}
