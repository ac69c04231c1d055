//! Conversation history display component

use crate::api::Citation;
use crate::conversation::{Message, MessageKind};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use std::cell::Cell;

/// Share of the width a message bubble may take
const BUBBLE_WIDTH_PERCENT: usize = 80;

/// Scroll position of the conversation history. Offsets count rendered lines
/// up from the bottom, so zero always shows the newest message.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    scroll_offset: usize,
    max_offset: Cell<usize>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scroll up by `lines`
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add(lines)
            .min(self.max_offset.get());
    }

    /// Scroll down by `lines`
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Scroll to bottom
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Widget drawing `messages` at the current scroll position
    pub fn view<'a>(&'a self, messages: &'a [Message], is_loading: bool) -> HistoryView<'a> {
        HistoryView {
            history: self,
            messages,
            is_loading,
        }
    }
}

/// Borrowed view of the history for one frame
pub struct HistoryView<'a> {
    history: &'a ConversationHistory,
    messages: &'a [Message],
    is_loading: bool,
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let all_lines = if self.messages.is_empty() && !self.is_loading {
            welcome_lines()
        } else {
            conversation_lines(self.messages, self.is_loading, inner_area.width as usize)
        };

        let height = inner_area.height as usize;
        let max_offset = all_lines.len().saturating_sub(height);
        self.history.max_offset.set(max_offset);

        let offset = self.history.scroll_offset.min(max_offset);
        let end = all_lines.len() - offset;
        let start = end.saturating_sub(height);
        let visible: Vec<Line> = all_lines[start..end].to_vec();

        Paragraph::new(visible).render(inner_area, buf);
    }
}

fn welcome_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(vec![Span::styled(
            "Ask a question to get started.",
            Style::default().fg(Color::Gray),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press Enter to send, /help for commands.",
            Style::default().fg(Color::DarkGray),
        )]),
    ]
}

/// Lay out every message group, then the thinking indicator
pub fn conversation_lines(messages: &[Message], is_loading: bool, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for message in messages {
        lines.extend(message_lines(message, width));
        for citation in &message.citations {
            lines.extend(citation_lines(citation, width));
        }
        // spacing between groups
        lines.push(Line::from(""));
    }

    if is_loading {
        lines.push(Line::from(vec![Span::styled(
            "Thinking...",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )]));
    }

    lines
}

fn bubble_width(width: usize) -> usize {
    (width * BUBBLE_WIDTH_PERCENT / 100).max(1)
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    for paragraph in text.lines() {
        if paragraph.is_empty() {
            wrapped.push(String::new());
            continue;
        }
        wrapped.extend(
            textwrap::wrap(paragraph, width)
                .into_iter()
                .map(|line| line.into_owned()),
        );
    }
    if wrapped.is_empty() {
        wrapped.push(String::new());
    }
    wrapped
}

fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let (label, label_style, content_style, alignment) = match message.kind {
        MessageKind::User => (
            "You",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White).bg(Color::Blue),
            Alignment::Right,
        ),
        MessageKind::Bot => (
            "Assistant",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Reset),
            Alignment::Left,
        ),
    };

    let mut lines = vec![Line::from(vec![Span::styled(label, label_style)]).alignment(alignment)];

    for content_line in wrap(&message.content, bubble_width(width).saturating_sub(2).max(1)) {
        lines.push(
            Line::from(vec![Span::styled(format!(" {} ", content_line), content_style)])
                .alignment(alignment),
        );
    }

    lines
}

fn citation_lines(citation: &Citation, width: usize) -> Vec<Line<'static>> {
    let muted = Style::default().fg(Color::Gray);
    let mut lines = vec![Line::from(vec![
        Span::raw("  "),
        Span::styled("Source: ", muted.add_modifier(Modifier::BOLD)),
        Span::styled(citation.display_title().to_string(), muted),
    ])];

    if let Some(snippet) = &citation.snippet {
        let quoted = format!("\"{}\"", snippet);
        for snippet_line in wrap(&quoted, width.saturating_sub(4).max(1)) {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(snippet_line, muted.add_modifier(Modifier::ITALIC)),
            ]));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn citation_without_title_falls_back_to_document() {
        let message = Message::bot(
            "150 psi",
            vec![Citation {
                title: None,
                snippet: Some("rated to 150 psi".to_string()),
            }],
        );

        let text = text_of(&conversation_lines(&[message], false, 60));
        assert_eq!(
            text,
            vec!["Assistant", "150 psi", "Source: Document", "\"rated to 150 psi\"", ""]
        );
    }

    #[test]
    fn citation_without_snippet_has_no_quote_line() {
        let message = Message::bot("ok", vec![Citation { title: Some("Spec A".to_string()), snippet: None }]);
        let text = text_of(&conversation_lines(&[message], false, 60));
        assert_eq!(text, vec!["Assistant", "ok", "Source: Spec A", ""]);
    }

    #[test]
    fn thinking_indicator_follows_last_message_only_while_loading() {
        let messages = vec![Message::user("hello")];

        let loading = text_of(&conversation_lines(&messages, true, 40));
        assert_eq!(loading.last().map(String::as_str), Some("Thinking..."));

        let idle = text_of(&conversation_lines(&messages, false, 40));
        assert!(!idle.iter().any(|line| line == "Thinking..."));
    }

    #[test]
    fn user_messages_are_right_aligned() {
        let lines = conversation_lines(&[Message::user("hi")], false, 40);
        assert_eq!(lines[0].alignment, Some(Alignment::Right));
        assert_eq!(lines[1].alignment, Some(Alignment::Right));
    }

    #[test]
    fn long_content_wraps_within_bubble() {
        let content = "word ".repeat(40);
        let lines = conversation_lines(&[Message::bot(content, Vec::new())], false, 50);
        for line in &lines {
            assert!(line.width() <= 50);
        }
        assert!(lines.len() > 4);
    }

    #[test]
    fn scroll_is_clamped_to_rendered_content() {
        let mut history = ConversationHistory::new();
        let messages: Vec<Message> = (0..20).map(|i| Message::user(format!("q{}", i))).collect();

        let area = Rect::new(0, 0, 30, 10);
        let mut buf = Buffer::empty(area);
        history.view(&messages, false).render(area, &mut buf);

        history.scroll_up(10_000);
        // 20 groups of 3 lines, 8 visible rows
        assert_eq!(history.scroll_offset(), 52);

        history.scroll_down(2);
        assert_eq!(history.scroll_offset(), 50);
        history.scroll_to_bottom();
        assert_eq!(history.scroll_offset(), 0);
    }
}
