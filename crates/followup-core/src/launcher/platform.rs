//! Native terminal strategies per operating system.

use std::path::Path;
use std::process::Command;
#[cfg(unix)]
use std::process::Stdio;
#[cfg(unix)]
use std::thread;
#[cfg(unix)]
use std::time::Duration;

#[cfg(unix)]
use super::ChildSession;
use super::{LaunchHandle, LaunchRequest, Strategy};
use crate::materializer::{MaterializedScript, ScriptKind};

/// Emulator binaries and the arguments that precede `sh <script>`.
///
/// Flags keep the emulator in the foreground where it supports that, so the
/// launcher process itself tracks the session.
pub const UNIX_TERMINALS: &[(&str, &[&str])] = &[
    ("gnome-terminal", &["--wait", "--"]),
    ("konsole", &["--nofork", "-e"]),
    ("xfce4-terminal", &["--disable-server", "-x"]),
    ("alacritty", &["-e"]),
    ("kitty", &[]),
    ("wezterm", &["start", "--always-new-process", "--"]),
    ("foot", &[]),
    ("xterm", &["-e"]),
    ("terminator", &["-x"]),
    ("x-terminal-emulator", &["-e"]),
];

/// How long a freshly spawned emulator gets to fail before it counts as
/// started.
#[cfg(unix)]
const SPAWN_SETTLE: Duration = Duration::from_millis(200);

pub(super) fn strategies() -> Vec<Strategy> {
    let mut strategies = Vec::new();
    if cfg!(windows) {
        strategies.push(Strategy {
            name: "powershell",
            launch: launch_powershell,
        });
        strategies.push(Strategy {
            name: "cmd",
            launch: launch_cmd,
        });
    } else if cfg!(target_os = "macos") {
        strategies.push(Strategy {
            name: "terminal-app",
            launch: launch_terminal_app,
        });
    }
    strategies.push(Strategy {
        name: "terminal-emulator",
        launch: launch_unix_emulator,
    });
    strategies
}

#[cfg(windows)]
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

#[cfg(windows)]
fn spawn_console(
    strategy: &'static str,
    mut command: Command,
    script: MaterializedScript,
) -> Option<LaunchHandle> {
    use std::os::windows::process::CommandExt;

    command.creation_flags(CREATE_NEW_CONSOLE);
    match command.spawn() {
        Ok(child) => Some(LaunchHandle::new(
            strategy,
            Box::new(super::ChildSession::new(child, None)),
            Some(script),
        )),
        Err(e) => {
            tracing::debug!(strategy, error = %e, "console spawn failed");
            None
        }
    }
}

#[cfg(windows)]
fn launch_powershell(request: &LaunchRequest) -> Option<LaunchHandle> {
    let script = request.script(ScriptKind::PowerShell)?;
    let mut command = Command::new("powershell.exe");
    command.args(["-NoProfile", "-ExecutionPolicy", "Bypass"]);
    if !request.close_terminal {
        command.arg("-NoExit");
    }
    command.arg("-File").arg(script.path());
    spawn_console("powershell", command, script)
}

#[cfg(not(windows))]
fn launch_powershell(_request: &LaunchRequest) -> Option<LaunchHandle> {
    None
}

#[cfg(windows)]
fn launch_cmd(request: &LaunchRequest) -> Option<LaunchHandle> {
    let script = request.script(ScriptKind::Batch)?;
    let mut command = Command::new("cmd.exe");
    command
        .arg(if request.close_terminal { "/C" } else { "/K" })
        .arg(script.path());
    spawn_console("cmd", command, script)
}

#[cfg(not(windows))]
fn launch_cmd(_request: &LaunchRequest) -> Option<LaunchHandle> {
    None
}

/// Terminal.app through AppleScript. `osascript` returns at once; the
/// script's pid file tracks the session afterwards.
fn launch_terminal_app(request: &LaunchRequest) -> Option<LaunchHandle> {
    if !cfg!(target_os = "macos") {
        return None;
    }
    let script = request.script(ScriptKind::Posix)?;
    let applescript = terminal_app_script(
        &script.path().to_string_lossy(),
        request.close_terminal,
    );
    let mut command = Command::new("osascript");
    command.arg("-e").arg(applescript);
    super::spawn_session("terminal-app", command, script)
}

pub(crate) fn terminal_app_script(script_path: &str, close_terminal: bool) -> String {
    let mut shell = format!("sh {}", crate::materializer::sh_quote(script_path));
    if close_terminal {
        shell.push_str("; exit");
    }
    format!(
        "tell application \"Terminal\"\n\tactivate\n\tdo script \"{}\"\nend tell",
        applescript_escape(&shell)
    )
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Splits a user-supplied terminal setting into binary and leading args.
///
/// Known emulators without explicit args get their table entry; unknown ones
/// get `-e`, the most common convention.
pub(crate) fn terminal_command(setting: &str) -> Option<(String, Vec<String>)> {
    let mut parts = setting.split_whitespace();
    let binary = parts.next()?.to_string();
    let mut args: Vec<String> = parts.map(str::to_string).collect();
    if args.is_empty() {
        let name = Path::new(&binary)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        args = UNIX_TERMINALS
            .iter()
            .find(|(known, _)| *known == name)
            .map_or_else(
                || vec!["-e".to_string()],
                |(_, known_args)| known_args.iter().map(|a| (*a).to_string()).collect(),
            );
    }
    Some((binary, args))
}

/// Ordered emulator candidates for this request.
pub(crate) fn emulator_candidates(request: &LaunchRequest) -> Vec<(String, Vec<String>)> {
    let mut candidates = Vec::new();
    let preferred = request
        .preferred_terminal
        .as_deref()
        .into_iter()
        .chain(request.env.get("TERMINAL"));
    for setting in preferred {
        if let Some(candidate) = terminal_command(setting) {
            candidates.push(candidate);
        }
    }
    for (binary, args) in UNIX_TERMINALS {
        if candidates.iter().any(|(b, _)| b == binary) {
            continue;
        }
        candidates.push((
            (*binary).to_string(),
            args.iter().map(|a| (*a).to_string()).collect(),
        ));
    }
    candidates
}

fn launch_unix_emulator(request: &LaunchRequest) -> Option<LaunchHandle> {
    if cfg!(windows) {
        return None;
    }
    if !request.env.has_display() {
        tracing::debug!("no DISPLAY or WAYLAND_DISPLAY; skipping terminal emulators");
        return None;
    }
    let script = request.script(ScriptKind::Posix)?;
    run_emulators(&emulator_candidates(request), script)
}

#[cfg(unix)]
fn run_emulators(
    candidates: &[(String, Vec<String>)],
    script: MaterializedScript,
) -> Option<LaunchHandle> {
    for (binary, args) in candidates {
        let mut command = Command::new(binary);
        command
            .args(args)
            .arg("sh")
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(terminal = %binary, error = %e, "terminal emulator unavailable");
                continue;
            }
        };

        thread::sleep(SPAWN_SETTLE);
        if let Ok(Some(status)) = child.try_wait()
            && !status.success()
        {
            tracing::warn!(terminal = %binary, %status, "terminal emulator exited early");
            continue;
        }

        tracing::info!(terminal = %binary, "opened terminal emulator");
        let pid_file = script.pid_file().map(Path::to_path_buf);
        return Some(LaunchHandle::new(
            "terminal-emulator",
            Box::new(ChildSession::new(child, pid_file)),
            Some(script),
        ));
    }
    None
}

#[cfg(not(unix))]
fn run_emulators(
    _candidates: &[(String, Vec<String>)],
    _script: MaterializedScript,
) -> Option<LaunchHandle> {
    None
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::super::HostEnv;
    use super::*;
    use crate::materializer::{PromptPayload, ScriptSpec, materialize};

    fn request(preferred: Option<&str>, env: &[(&str, &str)]) -> LaunchRequest {
        LaunchRequest {
            program: PathBuf::from("followup"),
            payload: PromptPayload::new("q", Vec::new()),
            output: PathBuf::from("out.json"),
            close_terminal: true,
            preferred_terminal: preferred.map(str::to_string),
            env: HostEnv::from_pairs(env.iter().copied()),
        }
    }

    #[test]
    fn test_preferred_terminal_comes_first_without_duplicates() {
        let candidates = emulator_candidates(&request(Some("kitty"), &[("TERMINAL", "foot")]));
        assert_eq!(candidates[0], ("kitty".to_string(), Vec::new()));
        assert_eq!(candidates[1].0, "foot");
        assert_eq!(candidates[2].0, "gnome-terminal");
        assert_eq!(candidates.iter().filter(|(b, _)| b == "kitty").count(), 1);
        assert_eq!(candidates.len(), UNIX_TERMINALS.len());
    }

    #[test]
    fn test_terminal_command_uses_known_args_or_dash_e() {
        assert_eq!(
            terminal_command("/usr/bin/konsole"),
            Some((
                "/usr/bin/konsole".to_string(),
                vec!["--nofork".to_string(), "-e".to_string()]
            ))
        );
        assert_eq!(
            terminal_command("urxvt"),
            Some(("urxvt".to_string(), vec!["-e".to_string()]))
        );
        assert_eq!(
            terminal_command("wezterm start --"),
            Some((
                "wezterm".to_string(),
                vec!["start".to_string(), "--".to_string()]
            ))
        );
        assert_eq!(terminal_command("  "), None);
    }

    #[test]
    fn test_emulators_skipped_without_display() {
        assert!(launch_unix_emulator(&request(Some("kitty"), &[])).is_none());
    }

    #[test]
    fn test_terminal_app_script_escapes_quotes() {
        let script = terminal_app_script("/tmp/a \"b\".sh", true);
        assert!(script.contains(r#"do script "sh '/tmp/a \"b\".sh'; exit""#));
        let keep_open = terminal_app_script("/tmp/x.sh", false);
        assert!(!keep_open.contains("exit"));
    }

    #[test]
    fn test_platform_table_ends_with_emulators() {
        let names: Vec<_> = strategies().iter().map(|s| s.name).collect();
        assert_eq!(names.last(), Some(&"terminal-emulator"));
    }

    #[cfg(unix)]
    fn posix_script(payload: &PromptPayload) -> MaterializedScript {
        materialize(
            &ScriptSpec {
                program: Path::new("true"),
                payload,
                output: Path::new("out.json"),
                close_terminal: true,
            },
            ScriptKind::Posix,
        )
        .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_emulator_falls_through_to_next() {
        let payload = PromptPayload::new("q", Vec::new());
        // `env sh <script>` behaves like an emulator that runs the command.
        let candidates = [
            ("definitely-not-a-terminal-xyz".to_string(), Vec::new()),
            ("false".to_string(), Vec::new()),
            ("env".to_string(), Vec::new()),
        ];
        let mut handle =
            run_emulators(&candidates, posix_script(&payload)).expect("env should start");
        assert_eq!(handle.strategy(), "terminal-emulator");
        let _ = handle.terminate();
    }

    #[cfg(unix)]
    #[test]
    fn test_all_emulators_failing_leaves_no_files_behind() {
        let payload = PromptPayload::new("q", Vec::new());
        let script = posix_script(&payload);
        let script_path = script.path().to_path_buf();
        let payload_path = script.payload_file().to_path_buf();
        let pid_path = script.pid_file().unwrap().to_path_buf();

        let candidates = [
            ("definitely-missing".to_string(), Vec::new()),
            ("false".to_string(), Vec::new()),
        ];
        assert!(run_emulators(&candidates, script).is_none());
        assert!(!script_path.exists());
        assert!(!payload_path.exists());
        assert!(!pid_path.exists());
    }
}
