//! Raw mode and alternate screen for the prompt.
//!
//! Restoration happens from three places: the runtime's `Drop`, the error
//! path of [`enter`], and the panic hook.

use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;

use anyhow::{Context, Result};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub type PromptTerminal = Terminal<CrosstermBackend<Stdout>>;

static PANIC_HOOK: Once = Once::new();

/// Switches stdout to raw mode, the alternate screen and bracketed paste.
///
/// Installs the restoring panic hook first. On failure whatever was already
/// switched on is switched off again.
///
/// # Errors
/// Returns an error if the terminal refuses any of the modes.
pub fn enter() -> Result<PromptTerminal> {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            leave();
            previous(info);
        }));
    });

    let entered = switch_on();
    if entered.is_err() {
        leave();
    }
    entered
}

fn switch_on() -> Result<PromptTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

/// Puts the terminal back into cooked mode. Idempotent; errors are ignored
/// since there is nobody left to report them to.
pub fn leave() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableBracketedPaste, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}
