use crate::events::ConversationAction;
use crate::ui::conversation::ConversationManager;
use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::panic;
use std::time::Duration;

/// How often the loop wakes up to pick up completed requests
const TICK: Duration = Duration::from_millis(50);

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Put the terminal in raw mode on the alternate screen
pub fn init_terminal() -> Result<Tui> {
    // Restore the terminal before a panic message is printed
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste)
        .context("Failed to leave alternate screen")?;
    Ok(())
}

/// Chat application driving a [`ConversationManager`]
pub struct App {
    manager: ConversationManager,
    running: bool,
}

impl App {
    pub fn new(manager: ConversationManager) -> Self {
        Self {
            manager,
            running: true,
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut event_stream = EventStream::new();

        self.draw(terminal)?;

        while self.running {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "Terminal event error");
                            return Err(e).context("Failed to read terminal event");
                        }
                        None => self.running = false,
                    }
                }
                _ = tokio::time::sleep(TICK) => {}
            }

            self.manager.process_events();
            self.draw(terminal)?;
        }

        tracing::info!("Leaving chat view");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if self.manager.handle_key(key) == ConversationAction::Exit {
                    self.running = false;
                }
            }
            Event::Paste(text) => self.manager.handle_paste(&text),
            _ => {}
        }
    }

    pub fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal
            .draw(|frame| frame.render_widget(&self.manager, frame.size()))
            .context("Failed to draw frame")?;
        Ok(())
    }
}
