//! Prompt reducer.
//!
//! Maps terminal events to session actions. All state changes of the prompt
//! go through [`update`].

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::{EditAction, InputMode, PromptAction, PromptSession};
use crate::text_buffer::CursorMove;

/// Applies one terminal event to the session.
pub fn update(session: &mut PromptSession, event: &Event) {
    match event {
        Event::Key(key) => handle_key(session, *key),
        Event::Paste(text) => session.edit(EditAction::Paste(text.clone())),
        _ => {}
    }
}

fn handle_key(session: &mut PromptSession, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => session.apply(PromptAction::Cancel),
        KeyCode::Char('c') if ctrl => session.apply(PromptAction::Cancel),
        KeyCode::Enter => session.apply(PromptAction::Confirm),
        KeyCode::Tab | KeyCode::BackTab => session.apply(PromptAction::ToggleInput),
        KeyCode::F(2) => session.apply(PromptAction::EditSelected),
        KeyCode::Up => session.apply(PromptAction::MoveUp),
        KeyCode::Down => session.apply(PromptAction::MoveDown),
        KeyCode::PageUp => session.apply(PromptAction::ScrollQuestionUp),
        KeyCode::PageDown => session.apply(PromptAction::ScrollQuestionDown),
        _ if session.mode() == InputMode::Editing => {
            if let Some(edit) = edit_action(key, ctrl, alt) {
                session.edit(edit);
            }
        }
        _ => {}
    }
}

fn edit_action(key: KeyEvent, ctrl: bool, alt: bool) -> Option<EditAction> {
    let action = match key.code {
        KeyCode::Char('w') if ctrl => EditAction::DeleteWordLeft,
        KeyCode::Char('u') if ctrl => EditAction::DeleteToHead,
        KeyCode::Char('a') if ctrl => EditAction::Move(CursorMove::Head),
        KeyCode::Char('e') if ctrl => EditAction::Move(CursorMove::End),
        KeyCode::Char(ch) if !ctrl && !alt => EditAction::Insert(ch),
        KeyCode::Backspace if alt || ctrl => EditAction::DeleteWordLeft,
        KeyCode::Backspace => EditAction::Backspace,
        KeyCode::Delete => EditAction::Delete,
        KeyCode::Left => EditAction::Move(CursorMove::Back),
        KeyCode::Right => EditAction::Move(CursorMove::Forward),
        KeyCode::Home => EditAction::Move(CursorMove::Head),
        KeyCode::End => EditAction::Move(CursorMove::End),
        _ => return None,
    };
    Some(action)
}
