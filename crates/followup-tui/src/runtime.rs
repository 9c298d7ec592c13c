//! Prompt runtime: owns the terminal and runs the event loop.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::layout::Rect;

use crate::state::{PromptOutcome, PromptSession};
use crate::{render, terminal, update};

/// Poll duration while waiting for input.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// How long the decision stays on screen before the prompt exits.
pub const CONFIRMATION_DURATION: Duration = Duration::from_millis(700);

/// Full-screen prompt runtime.
///
/// Terminal state is restored on drop and on panic.
pub struct PromptRuntime {
    terminal: terminal::PromptTerminal,
    pub session: PromptSession,
}

impl PromptRuntime {
    /// Enters the alternate screen and creates the runtime.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(session: PromptSession) -> Result<Self> {
        let terminal = terminal::enter().context("Failed to setup terminal")?;
        Ok(Self { terminal, session })
    }

    /// Runs until the session resolves.
    ///
    /// Drawing or input failures abort the session as cancelled.
    pub fn run(&mut self) -> PromptOutcome {
        if let Err(e) = self.event_loop() {
            tracing::warn!(error = %format!("{e:#}"), "prompt aborted");
            self.session.abort();
        }

        if let Some(outcome) = self.session.outcome().cloned() {
            self.show_confirmation();
            return outcome;
        }
        PromptOutcome::Cancelled
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.session.is_finished() {
            if dirty {
                let size = self.terminal.size().context("Failed to read terminal size")?;
                let area = Rect::new(0, 0, size.width, size.height);
                self.session
                    .set_question_overflow(render::question_overflow(area, &self.session));
                let session = &self.session;
                self.terminal
                    .draw(|frame| render::render(frame, session))
                    .context("Failed to draw prompt")?;
                dirty = false;
            }

            if event::poll(IDLE_POLL_DURATION).context("Failed to poll terminal events")? {
                let ev = event::read().context("Failed to read terminal event")?;
                update::update(&mut self.session, &ev);
                dirty = true;
            }
        }
        Ok(())
    }

    /// Shows the decision box briefly. Purely cosmetic; errors are ignored.
    fn show_confirmation(&mut self) {
        let session = &self.session;
        if self
            .terminal
            .draw(|frame| render::render(frame, session))
            .is_err()
        {
            return;
        }
        let deadline = Instant::now() + CONFIRMATION_DURATION;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            // Swallow keys pressed during the confirmation.
            match event::poll(remaining) {
                Ok(true) => {
                    let _ = event::read();
                }
                Ok(false) | Err(_) => break,
            }
        }
    }
}

impl Drop for PromptRuntime {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        terminal::leave();
    }
}
