use crate::api::{QaResponse, RequestError};

/// Internal application events delivered to the UI loop
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The outstanding query finished, successfully or not
    QueryResolved(Result<QaResponse, RequestError>),
}

/// What the UI loop should do after handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}
