use crate::api::{ApiError, ChatBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One turn's worth of text. Immutable once appended; ordering in the log
/// equals arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// One user's conversation: an append-only message log plus the state of the
/// turn in flight. Owned by the caller and passed in by handle; there is no
/// global session.
#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<Message>,
    state: TurnState,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_awaiting(&self) -> bool {
        self.state == TurnState::AwaitingResponse
    }

    /// The surfaced failure from the most recent turn, if it failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts a turn: records the user message and moves to
    /// `AwaitingResponse`. Returns false (and records nothing) if a turn is
    /// already in flight or the message is blank — one outstanding backend
    /// call per session, never two user messages from the same turn.
    pub fn begin_turn(&mut self, message: &str) -> bool {
        if self.is_awaiting() || message.trim().is_empty() {
            return false;
        }
        self.last_error = None;
        self.messages.push(Message {
            role: Role::User,
            content: message.to_string(),
        });
        self.state = TurnState::AwaitingResponse;
        true
    }

    /// Resolves the turn started by `begin_turn`. A non-empty answer is
    /// appended as the assistant message; an empty answer appends nothing
    /// (the backend omitting its response field is passed through, not
    /// treated as an error). A failure leaves the log as-is, with the user
    /// message still recorded, and surfaces the classified cause.
    pub fn complete_turn(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(text) => {
                if !text.is_empty() {
                    self.messages.push(Message {
                        role: Role::Assistant,
                        content: text,
                    });
                }
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
            }
        }
        self.state = TurnState::Idle;
    }

    /// Clears the whole log. Refused while a turn is in flight.
    pub fn reset(&mut self) {
        if self.is_awaiting() {
            return;
        }
        self.messages.clear();
        self.last_error = None;
    }
}

/// Runs one complete turn against a backend: append the user message, wait
/// for the call to resolve, append the answer or surface the failure.
/// Returns false if the turn could not start.
pub async fn run_turn<B: ChatBackend>(session: &mut Session, backend: &B, message: &str) -> bool {
    if !session.begin_turn(message) {
        return false;
    }
    let result = backend.send(message).await;
    session.complete_turn(result);
    true
}
