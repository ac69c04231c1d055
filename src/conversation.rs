use crate::api::{Citation, QaResponse, QaTransport, RequestError};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Bot,
}

/// A single entry in the conversation, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub content: String,
    pub citations: Vec<Citation>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::User,
            content: content.into(),
            citations: Vec::new(),
        }
    }

    pub fn bot(content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            kind: MessageKind::Bot,
            content: content.into(),
            citations,
        }
    }
}

/// Everything the transport needs for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub query: String,
    pub conversation_id: Option<String>,
    pub user_id: String,
}

/// Produces the user id attached to each request
pub type UserIdGenerator = Box<dyn FnMut() -> String + Send>;

/// `user-<unix millis>`, recomputed per request
pub fn timestamp_user_id() -> String {
    format!("user-{}", chrono::Utc::now().timestamp_millis())
}

/// Bot message shown when a request fails
pub fn error_reply(err: &RequestError) -> String {
    format!(
        "Sorry, I encountered an error: {}. Please try again.",
        err.message()
    )
}

/// Chat state behind the view. [`Conversation::submit`] records the user turn
/// and hands back the request to send; [`Conversation::resolve`] records the
/// outcome and clears the loading flag.
pub struct Conversation {
    messages: Vec<Message>,
    input: String,
    is_loading: bool,
    conversation_id: Option<String>,
    next_user_id: UserIdGenerator,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_user_ids(Box::new(timestamp_user_id))
    }

    pub fn with_user_ids(next_user_id: UserIdGenerator) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            is_loading: false,
            conversation_id: None,
            next_user_id,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Replace the input with the control's current text
    pub fn update_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the send control is enabled
    pub fn can_submit(&self) -> bool {
        !self.is_loading && !self.input.trim().is_empty()
    }

    /// Start a submission. Returns `None` without touching state when the
    /// input is blank or a request is already outstanding.
    pub fn submit(&mut self) -> Option<PendingQuery> {
        if !self.can_submit() {
            return None;
        }

        let query = std::mem::take(&mut self.input);
        self.messages.push(Message::user(query.clone()));
        self.is_loading = true;

        Some(PendingQuery {
            query,
            conversation_id: self.conversation_id.clone(),
            user_id: (self.next_user_id)(),
        })
    }

    /// Record the outcome of the outstanding request.
    pub fn resolve(&mut self, outcome: Result<QaResponse, RequestError>) {
        match outcome {
            Ok(response) => {
                self.conversation_id = Some(response.conversation_id);
                self.messages
                    .push(Message::bot(response.text, response.citations));
            }
            Err(err) => {
                self.messages.push(Message::bot(error_reply(&err), Vec::new()));
            }
        }
        self.is_loading = false;
    }

    /// Submit and wait for the transport inline. Returns `false` when the
    /// input was not submittable.
    pub async fn exchange(&mut self, transport: &dyn QaTransport) -> bool {
        let Some(pending) = self.submit() else {
            return false;
        };

        let outcome = transport
            .send_query(
                &pending.query,
                pending.conversation_id.as_deref(),
                &pending.user_id,
            )
            .await;
        self.resolve(outcome);
        true
    }
}
