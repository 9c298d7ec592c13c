//! Prompt session state machine.
//!
//! A session is either browsing the option list or editing the custom answer.
//! It resolves exactly once to a [`PromptOutcome`]; after that every action
//! is ignored.

use crate::text_buffer::{CursorMove, TextBuffer};

/// Lines moved per question scroll step.
pub const QUESTION_SCROLL_STEP: usize = 5;

/// Which part of the prompt has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browsing,
    Editing,
}

/// Final result of a prompt session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// One of the offered options, verbatim.
    Selected(String),
    /// Free text typed by the user, trimmed.
    Custom(String),
    Cancelled,
}

impl PromptOutcome {
    /// The answer to hand back, or `None` on cancellation.
    pub fn into_answer(self) -> Option<String> {
        match self {
            PromptOutcome::Selected(text) | PromptOutcome::Custom(text) => Some(text),
            PromptOutcome::Cancelled => None,
        }
    }
}

/// Navigation-level actions, decoupled from concrete keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    MoveUp,
    MoveDown,
    /// Tab: browsing ↔ editing.
    ToggleInput,
    /// Start editing a copy of the highlighted option.
    EditSelected,
    Confirm,
    Cancel,
    /// Scroll a question taller than its area; works in every mode.
    ScrollQuestionUp,
    ScrollQuestionDown,
}

/// Text edits applied to the custom answer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Insert(char),
    Paste(String),
    Backspace,
    Delete,
    DeleteWordLeft,
    DeleteToHead,
    Move(CursorMove),
}

/// State of one prompt invocation.
#[derive(Debug, Clone)]
pub struct PromptSession {
    question: String,
    options: Vec<String>,
    selected: usize,
    mode: InputMode,
    draft: TextBuffer,
    /// Set once the draft text was changed by the user; options are not
    /// highlighted again afterwards.
    typed: bool,
    /// First question line shown.
    question_scroll: usize,
    /// Question lines that did not fit at the last layout.
    question_overflow: usize,
    outcome: Option<PromptOutcome>,
}

impl PromptSession {
    pub fn new(question: impl Into<String>, options: Vec<String>) -> Self {
        let mode = if options.is_empty() {
            InputMode::Editing
        } else {
            InputMode::Browsing
        };
        Self {
            question: question.into(),
            options,
            selected: 0,
            mode,
            draft: TextBuffer::default(),
            typed: false,
            question_scroll: 0,
            question_overflow: 0,
            outcome: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn draft(&self) -> &TextBuffer {
        &self.draft
    }

    pub fn has_typed(&self) -> bool {
        self.typed
    }

    pub fn question_scroll(&self) -> usize {
        self.question_scroll
    }

    /// Records how many question lines do not fit on screen and keeps the
    /// scroll offset within that range.
    pub fn set_question_overflow(&mut self, overflow: usize) {
        self.question_overflow = overflow;
        self.question_scroll = self.question_scroll.min(overflow);
    }

    pub fn outcome(&self) -> Option<&PromptOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn take_outcome(&mut self) -> Option<PromptOutcome> {
        self.outcome.take()
    }

    /// Index of the option to highlight, if any.
    ///
    /// Only while browsing, and never again once the user has typed.
    pub fn highlighted(&self) -> Option<usize> {
        (self.mode == InputMode::Browsing && !self.typed && !self.options.is_empty())
            .then_some(self.selected)
    }

    pub fn apply(&mut self, action: PromptAction) {
        if self.is_finished() {
            return;
        }
        match (self.mode, action) {
            (_, PromptAction::Cancel) => self.finish(PromptOutcome::Cancelled),
            (_, PromptAction::ScrollQuestionUp) => {
                self.question_scroll = self.question_scroll.saturating_sub(QUESTION_SCROLL_STEP);
            }
            (_, PromptAction::ScrollQuestionDown) => {
                self.question_scroll =
                    (self.question_scroll + QUESTION_SCROLL_STEP).min(self.question_overflow);
            }
            (InputMode::Browsing, PromptAction::MoveUp) => self.step(-1),
            (InputMode::Browsing, PromptAction::MoveDown) => self.step(1),
            (InputMode::Browsing, PromptAction::ToggleInput | PromptAction::EditSelected) => {
                self.start_editing();
            }
            (InputMode::Browsing, PromptAction::Confirm) => {
                if let Some(option) = self.options.get(self.selected) {
                    self.finish(PromptOutcome::Selected(option.clone()));
                }
            }
            (InputMode::Editing, PromptAction::ToggleInput) => {
                if !self.typed && !self.options.is_empty() {
                    self.mode = InputMode::Browsing;
                }
            }
            (InputMode::Editing, PromptAction::Confirm) => {
                let text = self.draft.text().trim();
                if !text.is_empty() {
                    let text = text.to_string();
                    self.finish(PromptOutcome::Custom(text));
                }
            }
            (
                InputMode::Editing,
                PromptAction::MoveUp | PromptAction::MoveDown | PromptAction::EditSelected,
            ) => {}
        }
    }

    /// Applies a text edit. Ignored unless editing.
    pub fn edit(&mut self, action: EditAction) {
        if self.is_finished() || self.mode != InputMode::Editing {
            return;
        }
        let before = self.draft.text().to_string();
        match action {
            EditAction::Insert(ch) => self.draft.insert_char(ch),
            EditAction::Paste(text) => self.draft.insert_str(&text),
            EditAction::Backspace => self.draft.delete_prev_char(),
            EditAction::Delete => self.draft.delete_next_char(),
            EditAction::DeleteWordLeft => self.draft.delete_word_left(),
            EditAction::DeleteToHead => self.draft.delete_to_head(),
            EditAction::Move(movement) => self.draft.move_cursor(movement),
        }
        if self.draft.text() != before {
            self.typed = true;
        }
    }

    /// Cancels the session, e.g. after a terminal failure.
    pub fn abort(&mut self) {
        self.finish(PromptOutcome::Cancelled);
    }

    fn step(&mut self, delta: isize) {
        let len = self.options.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len as isize) as usize;
    }

    fn start_editing(&mut self) {
        if !self.typed
            && let Some(option) = self.options.get(self.selected)
        {
            self.draft.set_text(option);
        }
        self.mode = InputMode::Editing;
    }

    fn finish(&mut self, outcome: PromptOutcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no() -> PromptSession {
        PromptSession::new("Continue?", vec!["Yes".into(), "No".into()])
    }

    fn type_text(session: &mut PromptSession, text: &str) {
        for ch in text.chars() {
            session.edit(EditAction::Insert(ch));
        }
    }

    #[test]
    fn starts_browsing_with_options_and_editing_without() {
        assert_eq!(yes_no().mode(), InputMode::Browsing);
        assert_eq!(yes_no().highlighted(), Some(0));
        let free = PromptSession::new("Anything?", Vec::new());
        assert_eq!(free.mode(), InputMode::Editing);
        assert_eq!(free.highlighted(), None);
    }

    #[test]
    fn select_second_option() {
        let mut session = yes_no();
        session.apply(PromptAction::MoveDown);
        session.apply(PromptAction::Confirm);
        assert_eq!(session.outcome(), Some(&PromptOutcome::Selected("No".into())));
    }

    #[test]
    fn selecting_any_index_returns_that_option_verbatim() {
        let options: Vec<String> = vec![
            "  padded  ".into(),
            "quote \" and \\ slash".into(),
            "ünïcödé ✓".into(),
            String::new(),
        ];
        for index in 0..options.len() {
            let mut session = PromptSession::new("Pick", options.clone());
            for _ in 0..index {
                session.apply(PromptAction::MoveDown);
            }
            session.apply(PromptAction::Confirm);
            assert_eq!(
                session.take_outcome(),
                Some(PromptOutcome::Selected(options[index].clone()))
            );
        }
    }

    #[test]
    fn navigation_wraps() {
        let mut session = yes_no();
        session.apply(PromptAction::MoveUp);
        assert_eq!(session.selected(), 1);
        session.apply(PromptAction::MoveDown);
        assert_eq!(session.selected(), 0);
    }

    #[test]
    fn custom_answer_without_options() {
        let mut session = PromptSession::new("Anything?", Vec::new());
        type_text(&mut session, "  Custom answer  ");
        session.apply(PromptAction::Confirm);
        assert_eq!(
            session.outcome(),
            Some(&PromptOutcome::Custom("Custom answer".into()))
        );
    }

    #[test]
    fn whitespace_only_confirm_is_a_no_op() {
        let mut session = PromptSession::new("Anything?", Vec::new());
        session.apply(PromptAction::Confirm);
        assert!(!session.is_finished());
        type_text(&mut session, "   ");
        session.apply(PromptAction::Confirm);
        assert!(!session.is_finished());
        assert_eq!(session.mode(), InputMode::Editing);
    }

    #[test]
    fn tab_seeds_draft_with_selected_option() {
        let mut session = yes_no();
        session.apply(PromptAction::MoveDown);
        session.apply(PromptAction::ToggleInput);
        assert_eq!(session.mode(), InputMode::Editing);
        assert_eq!(session.draft().text(), "No");
        assert_eq!(session.highlighted(), None);

        type_text(&mut session, " thanks");
        session.apply(PromptAction::Confirm);
        assert_eq!(
            session.outcome(),
            Some(&PromptOutcome::Custom("No thanks".into()))
        );
    }

    #[test]
    fn tab_back_only_before_typing() {
        let mut session = yes_no();
        session.apply(PromptAction::ToggleInput);
        session.apply(PromptAction::ToggleInput);
        assert_eq!(session.mode(), InputMode::Browsing);
        assert_eq!(session.highlighted(), Some(0));

        session.apply(PromptAction::ToggleInput);
        type_text(&mut session, "!");
        session.apply(PromptAction::ToggleInput);
        assert_eq!(session.mode(), InputMode::Editing);
    }

    #[test]
    fn highlight_stays_off_after_typing() {
        let mut session = yes_no();
        session.apply(PromptAction::ToggleInput);
        session.edit(EditAction::Backspace);
        assert!(session.has_typed());
        session.apply(PromptAction::ToggleInput);
        assert_eq!(session.highlighted(), None);
    }

    #[test]
    fn cursor_moves_do_not_count_as_typing() {
        let mut session = yes_no();
        session.apply(PromptAction::ToggleInput);
        session.edit(EditAction::Move(CursorMove::Head));
        session.edit(EditAction::Delete);
        // Deleting at the head of "Yes" changes the text.
        assert!(session.has_typed());

        let mut untouched = yes_no();
        untouched.apply(PromptAction::ToggleInput);
        untouched.edit(EditAction::Move(CursorMove::Back));
        assert!(!untouched.has_typed());
    }

    #[test]
    fn edit_selected_never_toggles_back() {
        let mut session = yes_no();
        session.apply(PromptAction::EditSelected);
        assert_eq!(session.mode(), InputMode::Editing);
        session.apply(PromptAction::EditSelected);
        assert_eq!(session.mode(), InputMode::Editing);
    }

    #[test]
    fn cancel_from_every_state() {
        let mut browsing = yes_no();
        browsing.apply(PromptAction::Cancel);
        assert_eq!(browsing.outcome(), Some(&PromptOutcome::Cancelled));

        let mut editing = yes_no();
        editing.apply(PromptAction::ToggleInput);
        type_text(&mut editing, "draft");
        editing.apply(PromptAction::Cancel);
        assert_eq!(editing.outcome(), Some(&PromptOutcome::Cancelled));

        let mut empty = PromptSession::new("?", Vec::new());
        empty.apply(PromptAction::Cancel);
        assert_eq!(empty.take_outcome().and_then(PromptOutcome::into_answer), None);
    }

    #[test]
    fn outcome_is_set_once() {
        let mut session = yes_no();
        session.apply(PromptAction::Confirm);
        session.apply(PromptAction::Cancel);
        session.apply(PromptAction::MoveDown);
        session.edit(EditAction::Insert('x'));
        session.abort();
        assert_eq!(session.outcome(), Some(&PromptOutcome::Selected("Yes".into())));
        assert_eq!(session.selected(), 0);
    }

    #[test]
    fn edits_ignored_while_browsing() {
        let mut session = yes_no();
        session.edit(EditAction::Insert('x'));
        assert!(session.draft().is_empty());
        assert!(!session.has_typed());
    }

    #[test]
    fn question_scroll_stays_within_overflow() {
        let mut session = yes_no();
        session.apply(PromptAction::ScrollQuestionDown);
        assert_eq!(session.question_scroll(), 0, "nothing to scroll yet");

        session.set_question_overflow(7);
        session.apply(PromptAction::ScrollQuestionDown);
        assert_eq!(session.question_scroll(), QUESTION_SCROLL_STEP);
        session.apply(PromptAction::ScrollQuestionDown);
        assert_eq!(session.question_scroll(), 7);

        session.set_question_overflow(2);
        assert_eq!(session.question_scroll(), 2, "shrinks with a larger window");
        session.apply(PromptAction::ScrollQuestionUp);
        assert_eq!(session.question_scroll(), 0);
        assert_eq!(session.selected(), 0);
        assert!(!session.is_finished());
    }
}
