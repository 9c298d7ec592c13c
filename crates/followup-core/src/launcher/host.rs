//! Strategies driven by the environment the asking process runs in.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use regex::Regex;

use super::{HostEnv, LaunchHandle, LaunchRequest};
use crate::materializer::ScriptKind;

/// Editor whose integrated terminal hosts the asking process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorHost {
    VsCode,
    JetBrains,
    Zed,
}

impl EditorHost {
    pub fn detect(env: &HostEnv) -> Option<Self> {
        if env.get("TERM_PROGRAM") == Some("vscode") {
            Some(EditorHost::VsCode)
        } else if env.get("TERMINAL_EMULATOR") == Some("JetBrains-JediTerm") {
            Some(EditorHost::JetBrains)
        } else if env.get("ZED_TERM").is_some() {
            Some(EditorHost::Zed)
        } else {
            None
        }
    }
}

/// Directories under the user config dir used by VS Code and its forks.
const VSCODE_FAMILY: &[&str] = &["Code", "Code - Insiders", "Cursor", "Windsurf", "VSCodium"];

/// Opens the editor user's configured external terminal.
///
/// Only the VS Code family exposes such a setting; other editors decline so
/// the platform strategies run.
pub(super) fn launch_editor_terminal(request: &LaunchRequest) -> Option<LaunchHandle> {
    let host = EditorHost::detect(&request.env)?;
    tracing::debug!(?host, "running inside an editor terminal");
    if host != EditorHost::VsCode || cfg!(windows) {
        return None;
    }

    let setting = vscode_settings_paths()
        .into_iter()
        .find_map(|path| {
            let content = fs::read_to_string(&path).ok()?;
            external_terminal_setting(&content, settings_key())
        })?;
    let (binary, args) = super::platform::terminal_command(&setting)?;

    let script = request.script(ScriptKind::Posix)?;
    let mut command = Command::new(binary);
    command.args(args).arg("sh").arg(script.path());
    super::spawn_session("editor", command, script)
}

fn settings_key() -> &'static str {
    if cfg!(target_os = "macos") {
        "terminal.external.osxExec"
    } else if cfg!(windows) {
        "terminal.external.windowsExec"
    } else {
        "terminal.external.linuxExec"
    }
}

fn vscode_settings_paths() -> Vec<PathBuf> {
    let Some(config) = dirs::config_dir() else {
        return Vec::new();
    };
    VSCODE_FAMILY
        .iter()
        .map(|dir| config.join(dir).join("User").join("settings.json"))
        .collect()
}

/// Extracts a string setting from a VS Code `settings.json`.
///
/// The file is JSON with comments, so a plain regex is used rather than a
/// JSON parser.
pub(crate) fn external_terminal_setting(settings: &str, key: &str) -> Option<String> {
    let pattern = format!(r#""{}"\s*:\s*"((?:[^"\\]|\\.)*)""#, regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(settings)?.get(1)?.as_str();
    let value = raw.replace("\\\\", "\\").replace("\\\"", "\"");
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Opens a new tmux window when the asking process lives inside tmux.
pub(super) fn launch_tmux(request: &LaunchRequest) -> Option<LaunchHandle> {
    if cfg!(windows) || request.env.get("TMUX").is_none() {
        return None;
    }
    let script = request.script(ScriptKind::Posix)?;
    let mut command = Command::new("tmux");
    command
        .args(["new-window", "-n", "follow-up", "sh"])
        .arg(script.path());
    super::spawn_session("tmux", command, script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_editor_hosts() {
        let vscode = HostEnv::from_pairs([("TERM_PROGRAM", "vscode")]);
        assert_eq!(EditorHost::detect(&vscode), Some(EditorHost::VsCode));

        let jetbrains = HostEnv::from_pairs([("TERMINAL_EMULATOR", "JetBrains-JediTerm")]);
        assert_eq!(EditorHost::detect(&jetbrains), Some(EditorHost::JetBrains));

        let zed = HostEnv::from_pairs([("ZED_TERM", "true")]);
        assert_eq!(EditorHost::detect(&zed), Some(EditorHost::Zed));

        let plain = HostEnv::from_pairs([("TERM_PROGRAM", "iTerm.app")]);
        assert_eq!(EditorHost::detect(&plain), None);
    }

    #[test]
    fn test_reads_external_terminal_setting() {
        let settings = r#"{
            // comments are allowed here
            "editor.fontSize": 14,
            "terminal.external.linuxExec": "kitty",
            "terminal.external.windowsExec": "C:\\Program Files\\wt.exe",
        }"#;
        assert_eq!(
            external_terminal_setting(settings, "terminal.external.linuxExec").as_deref(),
            Some("kitty")
        );
        assert_eq!(
            external_terminal_setting(settings, "terminal.external.windowsExec").as_deref(),
            Some(r"C:\Program Files\wt.exe")
        );
        assert_eq!(
            external_terminal_setting(settings, "terminal.external.osxExec"),
            None
        );
    }

    #[test]
    fn test_blank_setting_is_ignored() {
        let settings = r#"{"terminal.external.linuxExec": "  "}"#;
        assert_eq!(
            external_terminal_setting(settings, "terminal.external.linuxExec"),
            None
        );
    }

    #[test]
    fn test_non_vscode_editors_fall_through() {
        let request = LaunchRequest {
            program: PathBuf::from("followup"),
            payload: crate::materializer::PromptPayload::new("q", Vec::new()),
            output: PathBuf::from("out.json"),
            close_terminal: true,
            preferred_terminal: None,
            env: HostEnv::from_pairs([("ZED_TERM", "true")]),
        };
        assert!(launch_editor_terminal(&request).is_none());
        assert!(launch_tmux(&request).is_none());
    }
}
