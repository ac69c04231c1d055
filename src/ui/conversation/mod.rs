//! Conversation UI components for chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod manager;

pub use commands::{get_help_text, parse_slash_command, SlashCommand};
pub use composer::ConversationComposer;
pub use history::ConversationHistory;
pub use manager::ConversationManager;
