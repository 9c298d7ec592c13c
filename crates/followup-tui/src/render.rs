//! Pure rendering of a prompt session.

use std::mem;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph,
};
use unicode_width::UnicodeWidthChar;

use crate::state::{InputMode, PromptOutcome, PromptSession};

pub const PLACEHOLDER: &str = "Type your custom message";
const PROMPT: &str = "> ";
const ACCENT: Color = Color::Cyan;

/// Keyboard hint shown in the footer.
struct InputHint<'a> {
    key: &'a str,
    action: &'a str,
}

impl<'a> InputHint<'a> {
    fn new(key: &'a str, action: &'a str) -> Self {
        Self { key, action }
    }
}

fn frame_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .title(" Follow-up question ")
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

/// Wrapped question lines and the height they get inside `inner`.
///
/// The question may take everything except the input box, the footer and
/// one option row.
fn question_layout(inner: Rect, session: &PromptSession) -> (Vec<String>, u16) {
    let content_width = inner.width.saturating_sub(2);
    let lines = wrap_text(session.question(), usize::from(content_width));
    let max_height = inner.height.saturating_sub(5).max(1);
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).clamp(1, max_height);
    (lines, height)
}

/// Number of question lines that do not fit a frame of size `area`.
pub fn question_overflow(area: Rect, session: &PromptSession) -> usize {
    let (lines, height) = question_layout(frame_block().inner(area), session);
    lines.len().saturating_sub(usize::from(height))
}

/// Draws the whole prompt, plus the confirmation box once decided.
pub fn render(frame: &mut Frame, session: &PromptSession) {
    let area = frame.area();
    let block = frame_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (question, question_height) = question_layout(inner, session);
    let overflow = question.len().saturating_sub(usize::from(question_height));
    let scroll = session.question_scroll().min(overflow);
    let options_height = if session.options().is_empty() {
        0
    } else {
        session.options().len() as u16 + 1
    };

    let [question_area, options_area, _, input_area, hints_area] = Layout::vertical([
        Constraint::Length(question_height),
        Constraint::Max(options_height),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    let question_lines: Vec<Line> = question
        .into_iter()
        .skip(scroll)
        .take(usize::from(question_height))
        .map(|line| Line::from(Span::styled(line, Style::default().add_modifier(Modifier::BOLD))))
        .collect();
    frame.render_widget(Paragraph::new(question_lines), pad_x(question_area));

    if options_height > 0 {
        render_options(frame, pad_x(options_area), session);
    }
    render_input(frame, input_area, session);
    let mut hints = hints_for(session);
    if overflow > 0 {
        hints.insert(0, InputHint::new("PgUp/PgDn", "scroll question"));
    }
    render_hints(frame, hints_area, &hints, ACCENT);

    if let Some(outcome) = session.outcome() {
        render_confirmation(frame, area, outcome);
    }
}

fn pad_x(area: Rect) -> Rect {
    Rect::new(
        area.x + 1,
        area.y,
        area.width.saturating_sub(2),
        area.height,
    )
}

fn render_options(frame: &mut Frame, area: Rect, session: &PromptSession) {
    // Options stay visible while editing but are dimmed and unselected.
    let text_style = if session.mode() == InputMode::Browsing {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let items: Vec<ListItem> = session
        .options()
        .iter()
        .map(|option| ListItem::new(Line::from(Span::styled(option.as_str(), text_style))))
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ")
        .highlight_spacing(HighlightSpacing::Always);

    let mut list_state = ListState::default();
    list_state.select(session.highlighted());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_input(frame: &mut Frame, area: Rect, session: &PromptSession) {
    let editing = session.mode() == InputMode::Editing;
    let border_color = if editing { ACCENT } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if editing {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(Style::default().fg(border_color))
        .title(" Custom answer ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let draft = session.draft();
    let prompt_width = PROMPT.len() as u16;
    let available = usize::from(inner.width.saturating_sub(prompt_width + 1));

    let mut spans = vec![Span::styled(PROMPT, Style::default().fg(border_color))];
    let cursor_offset = if draft.is_empty() {
        spans.push(Span::styled(
            PLACEHOLDER,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
        0
    } else {
        let (visible, offset) = visible_window(draft.text(), draft.cursor(), available);
        spans.push(Span::raw(visible));
        offset
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);

    if editing && !session.is_finished() && inner.width > 0 && inner.height > 0 {
        let x = inner.x + prompt_width + cursor_offset as u16;
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

/// Picks the slice of `text` to show so the cursor stays in view.
///
/// Returns the visible text and the cursor's display column within it.
pub fn visible_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let char_width = |c: &char| c.width().unwrap_or(0);

    let mut start = 0;
    let mut before: usize = chars[..cursor].iter().map(char_width).sum();
    while before > width && start < cursor {
        before -= char_width(&chars[start]);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for c in &chars[start..] {
        let w = char_width(c);
        if used + w > width {
            break;
        }
        visible.push(*c);
        used += w;
    }
    (visible, before)
}

fn hints_for(session: &PromptSession) -> Vec<InputHint<'static>> {
    match session.mode() {
        InputMode::Browsing => vec![
            InputHint::new("↑↓", "navigate"),
            InputHint::new("Enter", "select"),
            InputHint::new("Tab", "custom"),
            InputHint::new("F2", "edit"),
            InputHint::new("Esc", "cancel"),
        ],
        InputMode::Editing if !session.has_typed() && !session.options().is_empty() => vec![
            InputHint::new("Enter", "send"),
            InputHint::new("Tab", "options"),
            InputHint::new("Esc", "cancel"),
        ],
        InputMode::Editing => vec![
            InputHint::new("Enter", "send"),
            InputHint::new("Esc", "cancel"),
        ],
    }
}

/// Renders a line of keyboard hints.
fn render_hints(frame: &mut Frame, area: Rect, hints: &[InputHint], highlight_color: Color) {
    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(highlight_color)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let para = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(para, area);
}

fn render_confirmation(frame: &mut Frame, area: Rect, outcome: &PromptOutcome) {
    let (title, color, text) = match outcome {
        PromptOutcome::Selected(text) | PromptOutcome::Custom(text) => {
            (" Your answer ", Color::Green, text.as_str())
        }
        PromptOutcome::Cancelled => (" Cancelled ", Color::Yellow, "No answer will be sent."),
    };

    let width = area.width.saturating_sub(4).min(64);
    let lines = wrap_text(text, usize::from(width.saturating_sub(4)));
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(title)
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    let body: Vec<Line> = lines
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(color))))
        .collect();
    frame.render_widget(
        Paragraph::new(body).alignment(Alignment::Center).block(block),
        popup,
    );
}

/// Word-wraps `text` to `width` display columns.
///
/// Explicit newlines are kept; words wider than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width: usize = word.chars().map(|c| c.width().unwrap_or(0)).sum();

            if line_width > 0 && line_width + 1 + word_width > width {
                lines.push(mem::take(&mut line));
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }

            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if line_width + w > width && line_width > 0 {
                    lines.push(mem::take(&mut line));
                    line_width = 0;
                }
                line.push(c);
                line_width += w;
            }
        }
        lines.push(line);
    }

    lines
}
