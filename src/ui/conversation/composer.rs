use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, Widget,
    },
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    /// The text changed
    Edited,
    /// Enter was pressed
    Submit,
    None,
}

/// State for the text area within the composer. The cursor counts chars.
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    pub cursor_position: usize,
}

impl TextAreaState {
    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Single-line input with a send control
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
    enabled: bool,
    can_send: bool,
}

impl ConversationComposer {
    pub fn new(placeholder: String) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder,
            enabled: true,
            can_send: false,
        }
    }

    /// Handle key input. Keys are ignored while the input is disabled.
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press || !self.enabled {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => return ComposerResult::Submit,
            KeyCode::Char(c) => {
                self.insert_char(c);
                return ComposerResult::Edited;
            }
            KeyCode::Backspace => {
                if self.backspace() {
                    return ComposerResult::Edited;
                }
            }
            KeyCode::Delete => {
                if self.delete() {
                    return ComposerResult::Edited;
                }
            }
            KeyCode::Left => {
                self.state.cursor_position = self.state.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.state.cursor_position < self.state.char_len() {
                    self.state.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                self.state.cursor_position = 0;
            }
            KeyCode::End => {
                self.state.cursor_position = self.state.char_len();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert pasted text at the cursor, flattening newlines
    pub fn insert_str(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        for c in text.chars() {
            self.insert_char(if c == '\n' || c == '\r' { ' ' } else { c });
        }
    }

    fn insert_char(&mut self, c: char) {
        let at = self.state.byte_index(self.state.cursor_position);
        self.state.content.insert(at, c);
        self.state.cursor_position += 1;
    }

    /// Delete character before cursor
    fn backspace(&mut self) -> bool {
        if self.state.cursor_position == 0 {
            return false;
        }
        self.state.cursor_position -= 1;
        let at = self.state.byte_index(self.state.cursor_position);
        self.state.content.remove(at);
        true
    }

    /// Delete character at cursor
    fn delete(&mut self) -> bool {
        if self.state.cursor_position >= self.state.char_len() {
            return false;
        }
        let at = self.state.byte_index(self.state.cursor_position);
        self.state.content.remove(at);
        true
    }

    pub fn content(&self) -> &str {
        &self.state.content
    }

    pub fn clear(&mut self) {
        self.state = TextAreaState::default();
    }

    /// Enable or disable the input control
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the send control
    pub fn set_can_send(&mut self, can_send: bool) {
        self.can_send = can_send;
    }

    fn send_label(&self) -> Title<'static> {
        let style = if self.can_send {
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Title::from(Span::styled(" Send ", style))
            .position(Position::Bottom)
            .alignment(Alignment::Right)
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.enabled {
            Style::default().fg(Color::Blue)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(self.send_label());

        let inner_area = block.inner(area);
        block.render(area, buf);

        if inner_area.height == 0 {
            return;
        }

        let line = if self.state.content.is_empty() {
            let mut spans = Vec::new();
            if self.enabled {
                spans.push(Span::styled("▌", Style::default().fg(Color::Blue)));
            }
            spans.push(Span::styled(
                self.placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            ));
            Line::from(spans)
        } else {
            let chars: Vec<char> = self.state.content.chars().collect();
            let cursor = self.state.cursor_position.min(chars.len());
            let before: String = chars[..cursor].iter().collect();
            let after: String = chars[cursor..].iter().collect();

            // Keep the cursor in view on long input
            let width = inner_area.width as usize;
            let visible_before: String = if width > 1 && cursor >= width {
                chars[cursor + 1 - width..cursor].iter().collect()
            } else {
                before
            };

            let mut spans = vec![Span::raw(visible_before)];
            if self.enabled {
                spans.push(Span::styled("▌", Style::default().fg(Color::Blue)));
            }
            spans.push(Span::raw(after));
            Line::from(spans)
        };

        buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
    }
}
