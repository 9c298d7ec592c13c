//! Turns a question into a script that runs the prompt in another process.
//!
//! The question and options never appear in the script or on a command line:
//! they are written as JSON to a payload file next to the script, so neither
//! shell quoting nor argument length limits apply to them. Only the program
//! and file paths are quoted, per script dialect.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::{Builder, TempPath};

/// Subcommand of the `followup` binary that hosts the prompt UI.
pub const PROMPT_SUBCOMMAND: &str = "prompt";

/// What the prompt process needs to render the question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub question: String,
    pub options: Vec<String>,
}

impl PromptPayload {
    pub fn new(question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            question: question.into(),
            options,
        }
    }

    /// Writes the payload into a fresh temp file, removed when the returned
    /// path is dropped.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn write_temp(&self) -> Result<TempPath> {
        let mut file = Builder::new()
            .prefix("followup_")
            .suffix(".payload.json")
            .tempfile()
            .context("create payload file")?;
        serde_json::to_writer(&mut file, self).context("serialize prompt payload")?;
        file.flush().context("flush payload file")?;
        Ok(file.into_temp_path())
    }

    /// Reads a payload file written by [`PromptPayload::write_temp`].
    ///
    /// # Errors
    /// Returns an error if the file is missing or not a payload.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("read prompt payload {}", path.display()))?;
        serde_json::from_slice(&bytes).context("prompt payload is not valid JSON")
    }
}

/// Script dialect understood by the terminal that will run it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// `/bin/sh` script; records its pid for liveness checks.
    Posix,
    /// PowerShell script for Windows consoles.
    PowerShell,
    /// `cmd.exe` batch file.
    Batch,
}

impl ScriptKind {
    fn suffix(self) -> &'static str {
        match self {
            ScriptKind::Posix => ".sh",
            ScriptKind::PowerShell => ".ps1",
            ScriptKind::Batch => ".cmd",
        }
    }
}

/// Inputs for one script.
#[derive(Debug, Clone)]
pub struct ScriptSpec<'a> {
    /// The `followup` executable to run inside the new terminal.
    pub program: &'a Path,
    pub payload: &'a PromptPayload,
    /// Where the prompt writes its answer.
    pub output: &'a Path,
    /// Whether the window may close as soon as the prompt ends.
    pub close_terminal: bool,
}

/// A script and its payload on disk, removed again when this value is
/// dropped.
#[derive(Debug)]
pub struct MaterializedScript {
    kind: ScriptKind,
    path: TempPath,
    payload_file: TempPath,
    pid_file: Option<TempPath>,
}

impl MaterializedScript {
    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn payload_file(&self) -> &Path {
        &self.payload_file
    }

    /// File the script writes its shell pid into (POSIX scripts only).
    pub fn pid_file(&self) -> Option<&Path> {
        self.pid_file.as_deref()
    }
}

/// Writes a script of the given dialect and its payload file into the temp
/// directory. Files created before a failure are removed again.
///
/// # Errors
/// Returns an error if a file cannot be created or written.
pub fn materialize(spec: &ScriptSpec<'_>, kind: ScriptKind) -> Result<MaterializedScript> {
    let payload_file = spec.payload.write_temp()?;
    let pid_file = match kind {
        ScriptKind::Posix => Some(
            Builder::new()
                .prefix("followup_")
                .suffix(".pid")
                .tempfile()
                .context("create pid file")?
                .into_temp_path(),
        ),
        ScriptKind::PowerShell | ScriptKind::Batch => None,
    };

    let content = render_script(spec, kind, &payload_file, pid_file.as_deref());

    let mut file = Builder::new()
        .prefix("followup_")
        .suffix(kind.suffix())
        .tempfile()
        .context("create script file")?;
    file.write_all(content.as_bytes())
        .context("write script file")?;
    file.flush().context("flush script file")?;
    let path = file.into_temp_path();

    #[cfg(unix)]
    if kind == ScriptKind::Posix {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .context("make script executable")?;
    }

    tracing::debug!(path = %path.display(), ?kind, "materialized prompt script");

    Ok(MaterializedScript {
        kind,
        path,
        payload_file,
        pid_file,
    })
}

/// Renders the script text.
pub fn render_script(
    spec: &ScriptSpec<'_>,
    kind: ScriptKind,
    payload_file: &Path,
    pid_file: Option<&Path>,
) -> String {
    let program = spec.program.to_string_lossy();
    let output = spec.output.to_string_lossy();
    let payload = payload_file.to_string_lossy();

    let script = match kind {
        ScriptKind::Posix => {
            let mut lines = vec!["#!/bin/sh".to_string()];
            if let Some(pid_file) = pid_file {
                lines.push(format!("echo $$ > {}", sh_quote(&pid_file.to_string_lossy())));
            }
            lines.push(format!(
                "{} {PROMPT_SUBCOMMAND} --output {} --payload-file {}",
                sh_quote(&program),
                sh_quote(&output),
                sh_quote(&payload),
            ));
            if let Some(pid_file) = pid_file {
                lines.push(format!("rm -f {}", sh_quote(&pid_file.to_string_lossy())));
            }
            if !spec.close_terminal {
                lines.push("printf '\\nPress Enter to close...'".to_string());
                lines.push("read _".to_string());
            }
            lines
        }
        ScriptKind::PowerShell => vec![
            "$ErrorActionPreference = 'Continue'".to_string(),
            format!(
                "& {} {PROMPT_SUBCOMMAND} --output {} --payload-file {}",
                ps_quote(&program),
                ps_quote(&output),
                ps_quote(&payload),
            ),
        ],
        ScriptKind::Batch => {
            let mut lines = vec![
                "@echo off".to_string(),
                format!(
                    "{} {PROMPT_SUBCOMMAND} --output {} --payload-file {}",
                    cmd_quote(&program),
                    cmd_quote(&output),
                    cmd_quote(&payload),
                ),
            ];
            if !spec.close_terminal {
                lines.push("pause".to_string());
            }
            lines
        }
    };

    let newline = match kind {
        ScriptKind::Posix => "\n",
        ScriptKind::PowerShell | ScriptKind::Batch => "\r\n",
    };
    let mut text = script.join(newline);
    text.push_str(newline);
    text
}

/// Single-quotes a string for `/bin/sh`.
pub fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Single-quotes a string for PowerShell (quotes are doubled).
pub fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Double-quotes a path for a batch file; `%` is doubled so it is not
/// expanded as a variable.
pub fn cmd_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('%', "%%"))
}

/// Resolves the program that hosts the prompt: the running executable.
///
/// # Errors
/// Returns an error if the current executable cannot be determined.
pub fn current_program() -> Result<PathBuf> {
    env::current_exe().context("locate the followup executable")
}
