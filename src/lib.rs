pub mod api;
pub mod app;
pub mod config;
pub mod conversation;
pub mod events;
pub mod ui;

pub use api::{Citation, HttpTransport, QaResponse, QaTransport, RequestError};
pub use config::{Config, UiConfig};
pub use conversation::{Conversation, Message, MessageKind};
