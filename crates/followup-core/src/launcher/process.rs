//! Liveness tracking for a launched prompt session.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Child;
use std::thread;
use std::time::{Duration, Instant};

/// How long an empty pid file keeps a session alive after its launcher
/// exited successfully. A script that has not started by then never will.
pub const PENDING_PID_GRACE: Duration = Duration::from_secs(30);

/// What the collector may do with a launched session.
pub trait SessionProcess: Send {
    /// Whether the prompt session is still running.
    fn is_alive(&mut self) -> bool;

    /// Asks the session to end. Best effort.
    ///
    /// # Errors
    /// Returns an error if the termination signal could not be delivered.
    fn terminate(&mut self) -> io::Result<()>;
}

/// A session started through a child process.
///
/// Many launchers (osascript, tmux, single-instance emulators) return long
/// before the prompt ends. For those the script writes its own pid into
/// `pid_file` and removes the file on exit, which is what gets tracked once
/// the launcher itself is gone. The pid file exists (empty) before launch, so
/// a missing file means the script already finished.
#[derive(Debug)]
pub struct ChildSession {
    child: Option<Child>,
    pid_file: Option<PathBuf>,
    launcher_succeeded: Option<bool>,
    launcher_exited_at: Option<Instant>,
    pending_grace: Duration,
    script_pid: Option<i32>,
}

impl ChildSession {
    pub fn new(child: Child, pid_file: Option<PathBuf>) -> Self {
        Self {
            child: Some(child),
            pid_file,
            launcher_succeeded: None,
            launcher_exited_at: None,
            pending_grace: PENDING_PID_GRACE,
            script_pid: None,
        }
    }

    /// Overrides [`PENDING_PID_GRACE`].
    #[must_use]
    pub fn with_pending_grace(mut self, grace: Duration) -> Self {
        self.pending_grace = grace;
        self
    }

    /// Checks the launcher process; returns `true` while it is still running.
    fn launcher_running(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                tracing::debug!(%status, "launcher process exited");
                self.launcher_succeeded = Some(status.success());
                self.launcher_exited_at = Some(Instant::now());
                self.child = None;
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to poll launcher process");
                self.launcher_succeeded = Some(false);
                self.launcher_exited_at = Some(Instant::now());
                self.child = None;
                false
            }
        }
    }

    /// An unwritten pid file counts as a starting script only after a
    /// successful launcher, and only for a bounded time.
    fn pending_in_grace(&self) -> bool {
        self.launcher_succeeded == Some(true)
            && self
                .launcher_exited_at
                .is_some_and(|exited| exited.elapsed() < self.pending_grace)
    }

    /// Reads the pid file, remembering the pid it contained.
    fn refresh_script_pid(&mut self) -> PidFileState {
        let Some(path) = self.pid_file.as_ref() else {
            return PidFileState::Untracked;
        };
        match fs::read_to_string(path) {
            Ok(content) => match content.trim().parse::<i32>() {
                Ok(pid) if pid > 0 => {
                    self.script_pid = Some(pid);
                    PidFileState::Running(pid)
                }
                _ => PidFileState::Pending,
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => PidFileState::Finished,
            Err(e) => {
                tracing::debug!(error = %e, "pid file unreadable");
                PidFileState::Pending
            }
        }
    }
}

enum PidFileState {
    Untracked,
    /// Created but not yet written by the script.
    Pending,
    Running(i32),
    Finished,
}

impl SessionProcess for ChildSession {
    fn is_alive(&mut self) -> bool {
        // Scripts write their pid before the prompt starts; keep it fresh even
        // while the launcher is in the foreground.
        let pid_state = self.refresh_script_pid();

        if self.launcher_running() {
            return true;
        }

        match pid_state {
            PidFileState::Untracked | PidFileState::Finished => false,
            PidFileState::Running(pid) => pid_alive(pid),
            PidFileState::Pending => self.pending_in_grace(),
        }
    }

    fn terminate(&mut self) -> io::Result<()> {
        let mut result = Ok(());
        if let Some(child) = self.child.as_mut() {
            result = child.kill();
        }
        if let Some(pid) = self.script_pid {
            result = terminate_pid(pid).and(result);
        }
        result
    }
}

impl Drop for ChildSession {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // Reap in the background so the launcher does not linger as a zombie.
            thread::spawn(move || {
                let _ = child.wait();
            });
        }
    }
}

#[cfg(unix)]
fn pid_alive(pid: i32) -> bool {
    // SAFETY: signal 0 only performs the existence and permission check.
    let rc = unsafe { libc::kill(pid, 0) };
    rc == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn pid_alive(_pid: i32) -> bool {
    false
}

#[cfg(unix)]
fn terminate_pid(pid: i32) -> io::Result<()> {
    // The script shell usually leads its own process group inside the new
    // terminal; hang the whole group up so the prompt goes with it.
    // SAFETY: plain signal delivery to a pid we recorded.
    if unsafe { libc::killpg(pid, libc::SIGHUP) } == 0 {
        return Ok(());
    }
    // SAFETY: as above.
    if unsafe { libc::kill(pid, libc::SIGTERM) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn terminate_pid(_pid: i32) -> io::Result<()> {
    Ok(())
}
