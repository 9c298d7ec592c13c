//! Starts the prompt inside a new, user-visible terminal.
//!
//! Launching is a prioritized table of strategies. Each strategy either
//! returns a running session or declines, and the first success wins:
//! editor host, terminal multiplexer, then the platform's own terminals.

mod host;
mod platform;
mod process;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::{env, error, fmt, io};

pub use process::{ChildSession, SessionProcess};

use crate::materializer::{self, MaterializedScript, PromptPayload, ScriptKind, ScriptSpec};

/// One way of opening a terminal.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub launch: fn(&LaunchRequest) -> Option<LaunchHandle>,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// Snapshot of the environment variables strategies look at.
#[derive(Debug, Clone, Default)]
pub struct HostEnv {
    vars: HashMap<String, String>,
}

impl HostEnv {
    pub fn from_process() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns a non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Whether a graphical session is available for X11/Wayland terminals.
    pub fn has_display(&self) -> bool {
        self.get("DISPLAY").is_some() || self.get("WAYLAND_DISPLAY").is_some()
    }
}

/// Everything a strategy needs to start one prompt.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// The `followup` executable run by the script.
    pub program: PathBuf,
    pub payload: PromptPayload,
    /// Answer file the prompt writes.
    pub output: PathBuf,
    pub close_terminal: bool,
    /// Emulator binary to try before the built-in list.
    pub preferred_terminal: Option<String>,
    pub env: HostEnv,
}

impl LaunchRequest {
    pub(crate) fn script(&self, kind: ScriptKind) -> Option<MaterializedScript> {
        let spec = ScriptSpec {
            program: &self.program,
            payload: &self.payload,
            output: &self.output,
            close_terminal: self.close_terminal,
        };
        match materializer::materialize(&spec, kind) {
            Ok(script) => Some(script),
            Err(e) => {
                tracing::warn!(error = %e, ?kind, "failed to write prompt script");
                None
            }
        }
    }
}

/// A started prompt session.
///
/// Owns the generated script; dropping the handle removes it.
pub struct LaunchHandle {
    strategy: &'static str,
    process: Box<dyn SessionProcess>,
    script: Option<MaterializedScript>,
}

impl LaunchHandle {
    pub fn new(
        strategy: &'static str,
        process: Box<dyn SessionProcess>,
        script: Option<MaterializedScript>,
    ) -> Self {
        Self {
            strategy,
            process,
            script,
        }
    }

    /// Name of the strategy that started the session.
    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    pub fn script_path(&self) -> Option<&Path> {
        self.script.as_ref().map(MaterializedScript::path)
    }

    pub fn is_alive(&mut self) -> bool {
        self.process.is_alive()
    }

    /// Requests termination of the session.
    ///
    /// # Errors
    /// Returns an error if the request could not be delivered.
    pub fn terminate(&mut self) -> io::Result<()> {
        self.process.terminate()
    }
}

impl fmt::Debug for LaunchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchHandle")
            .field("strategy", &self.strategy)
            .field("script", &self.script_path())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum LaunchError {
    /// Every strategy declined.
    NoTerminal { tried: Vec<&'static str> },
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::NoTerminal { tried } if tried.is_empty() => {
                write!(f, "no terminal available: no launch strategy applies here")
            }
            LaunchError::NoTerminal { tried } => {
                write!(f, "no terminal available (tried {})", tried.join(", "))
            }
        }
    }
}

impl error::Error for LaunchError {}

/// Ordered set of launch strategies.
#[derive(Debug, Clone)]
pub struct Launcher {
    strategies: Vec<Strategy>,
}

impl Launcher {
    /// Strategy table for the current platform.
    pub fn detect() -> Self {
        let mut strategies = vec![
            Strategy {
                name: "editor",
                launch: host::launch_editor_terminal,
            },
            Strategy {
                name: "tmux",
                launch: host::launch_tmux,
            },
        ];
        strategies.extend(platform::strategies());
        Self { strategies }
    }

    pub fn with_strategies(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }

    /// Tries each strategy in order.
    ///
    /// Blocking: strategies spawn processes and may briefly wait on them.
    ///
    /// # Errors
    /// Returns [`LaunchError::NoTerminal`] when every strategy declined.
    pub fn launch(&self, request: &LaunchRequest) -> Result<LaunchHandle, LaunchError> {
        let mut tried = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            tried.push(strategy.name);
            if let Some(handle) = (strategy.launch)(request) {
                tracing::info!(strategy = strategy.name, "launched prompt terminal");
                return Ok(handle);
            }
            tracing::debug!(strategy = strategy.name, "launch strategy declined");
        }
        Err(LaunchError::NoTerminal { tried })
    }
}

/// Spawns `command` and wraps it with the script's pid file.
pub(crate) fn spawn_session(
    strategy: &'static str,
    mut command: Command,
    script: MaterializedScript,
) -> Option<LaunchHandle> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    match command.spawn() {
        Ok(child) => {
            let pid_file = script.pid_file().map(Path::to_path_buf);
            Some(LaunchHandle::new(
                strategy,
                Box::new(ChildSession::new(child, pid_file)),
                Some(script),
            ))
        }
        Err(e) => {
            tracing::debug!(strategy, program = ?command.get_program(), error = %e, "spawn failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    struct Idle;

    impl SessionProcess for Idle {
        fn is_alive(&mut self) -> bool {
            true
        }

        fn terminate(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn decline(_: &LaunchRequest) -> Option<LaunchHandle> {
        None
    }

    fn accept(_: &LaunchRequest) -> Option<LaunchHandle> {
        Some(LaunchHandle::new("accept", Box::new(Idle), None))
    }

    fn panic_if_called(_: &LaunchRequest) -> Option<LaunchHandle> {
        panic!("strategies after a success must not run");
    }

    fn request() -> LaunchRequest {
        LaunchRequest {
            program: PathBuf::from("/usr/bin/followup"),
            payload: PromptPayload::new("Continue?", vec!["Yes".into()]),
            output: PathBuf::from("/tmp/out.json"),
            close_terminal: true,
            preferred_terminal: None,
            env: HostEnv::default(),
        }
    }

    #[test]
    fn test_first_accepting_strategy_wins() {
        let launcher = Launcher::with_strategies(vec![
            Strategy { name: "a", launch: decline },
            Strategy { name: "b", launch: accept },
            Strategy { name: "c", launch: panic_if_called },
        ]);
        let handle = launcher.launch(&request()).unwrap();
        assert_eq!(handle.strategy(), "accept");
    }

    #[test]
    fn test_all_declined_reports_tried_strategies() {
        let launcher = Launcher::with_strategies(vec![
            Strategy { name: "a", launch: decline },
            Strategy { name: "b", launch: decline },
        ]);
        match launcher.launch(&request()) {
            Err(LaunchError::NoTerminal { tried }) => assert_eq!(tried, vec!["a", "b"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_empty_table_is_no_terminal() {
        let err = Launcher::with_strategies(Vec::new())
            .launch(&request())
            .unwrap_err();
        assert!(err.to_string().starts_with("no terminal available"));
    }

    #[test]
    fn test_detect_orders_editor_and_tmux_first() {
        let names = Launcher::detect().strategy_names();
        assert_eq!(&names[..2], &["editor", "tmux"]);
        assert!(names.len() > 2);
    }

    #[test]
    fn test_host_env_ignores_blank_values() {
        let env = HostEnv::from_pairs([("DISPLAY", " "), ("WAYLAND_DISPLAY", "wayland-0")]);
        assert_eq!(env.get("DISPLAY"), None);
        assert!(env.has_display());
        assert!(!HostEnv::default().has_display());
    }
}
