use crate::api::QaTransport;
use crate::config::UiConfig;
use crate::conversation::{Conversation, PendingQuery};
use crate::events::{AppEvent, ConversationAction};
use crate::ui::conversation::commands::{get_help_text, parse_slash_command, SlashCommand};
use crate::ui::conversation::composer::ComposerResult;
use crate::ui::conversation::{ConversationComposer, ConversationHistory};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Lines moved per PageUp/PageDown
const PAGE_SCROLL: usize = 10;

/// Manages the conversation flow and UI components
pub struct ConversationManager {
    conversation: Conversation,
    history: ConversationHistory,
    composer: ConversationComposer,
    transport: Arc<dyn QaTransport>,
    ui: UiConfig,
    show_help: bool,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl ConversationManager {
    pub fn new(transport: Arc<dyn QaTransport>, ui: UiConfig) -> Self {
        Self::with_conversation(transport, ui, Conversation::new())
    }

    pub fn with_conversation(
        transport: Arc<dyn QaTransport>,
        ui: UiConfig,
        conversation: Conversation,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut manager = Self {
            conversation,
            history: ConversationHistory::new(),
            composer: ConversationComposer::new(ui.placeholder.clone()),
            transport,
            ui,
            show_help: false,
            event_tx,
            event_rx,
        };
        manager.sync_controls();
        manager
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ConversationAction::Exit;
            }
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                    return ConversationAction::None;
                }
                return ConversationAction::Exit;
            }
            KeyCode::PageUp => {
                self.history.scroll_up(PAGE_SCROLL);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.history.scroll_down(PAGE_SCROLL);
                return ConversationAction::None;
            }
            KeyCode::Up => {
                self.history.scroll_up(1);
                return ConversationAction::None;
            }
            KeyCode::Down => {
                self.history.scroll_down(1);
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key) {
            ComposerResult::Edited => {
                self.conversation.update_input(self.composer.content());
                self.sync_controls();
                ConversationAction::None
            }
            ComposerResult::Submit => self.submit(),
            ComposerResult::None => ConversationAction::None,
        }
    }

    /// Handle pasted text
    pub fn handle_paste(&mut self, text: &str) {
        self.composer.insert_str(text);
        self.conversation.update_input(self.composer.content());
        self.sync_controls();
    }

    /// Submit the composer content as a command or a query
    fn submit(&mut self) -> ConversationAction {
        if let Some(command) = parse_slash_command(self.composer.content()) {
            self.composer.clear();
            self.conversation.update_input("");
            self.sync_controls();
            return self.handle_slash_command(command);
        }

        if let Some(pending) = self.conversation.submit() {
            tracing::info!(user_id = %pending.user_id, "Submitting query");
            self.composer.clear();
            self.history.scroll_to_bottom();
            self.dispatch(pending);
        }
        self.sync_controls();
        ConversationAction::None
    }

    /// Run the transport call on its own task; the outcome comes back as an
    /// [`AppEvent`]. A completion arriving after the manager is gone is dropped.
    fn dispatch(&self, pending: PendingQuery) {
        let transport = Arc::clone(&self.transport);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let outcome = transport
                .send_query(
                    &pending.query,
                    pending.conversation_id.as_deref(),
                    &pending.user_id,
                )
                .await;
            let _ = tx.send(AppEvent::QueryResolved(outcome));
        });
    }

    /// Apply completed requests (called from main loop). Returns whether
    /// anything changed.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event);
            changed = true;
        }
        changed
    }

    /// Wait for the next completion. Used where there is no render loop.
    pub async fn next_event(&mut self) {
        if let Some(event) = self.event_rx.recv().await {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::QueryResolved(outcome) => {
                if let Err(err) = &outcome {
                    tracing::warn!(error = %err, "Query failed");
                }
                self.conversation.resolve(outcome);
                self.history.scroll_to_bottom();
                self.sync_controls();
            }
        }
    }

    fn handle_slash_command(&mut self, command: SlashCommand) -> ConversationAction {
        match command {
            SlashCommand::Help => {
                self.show_help = !self.show_help;
                ConversationAction::None
            }
            SlashCommand::Bye => ConversationAction::Exit,
        }
    }

    fn sync_controls(&mut self) {
        self.composer.set_enabled(!self.conversation.is_loading());
        self.composer.set_can_send(self.conversation.can_submit());
    }

    fn header(&self) -> Paragraph<'_> {
        Paragraph::new(vec![
            Line::from(Span::styled(
                self.ui.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.ui.subtitle.as_str(),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM))
    }
}

impl Widget for &ConversationManager {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Header, history, composer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(area);

        self.header().render(chunks[0], buf);
        self.history
            .view(self.conversation.messages(), self.conversation.is_loading())
            .render(chunks[1], buf);
        self.composer.render(chunks[2], buf);

        if self.show_help {
            let help_area = centered_rect(chunks[1], 60, 12);
            Clear.render(help_area, buf);
            Paragraph::new(get_help_text())
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Help")
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .render(help_area, buf);
        }
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
