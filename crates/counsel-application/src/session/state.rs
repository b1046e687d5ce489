//! In-memory session state.

use counsel_core::chat::ChatTurn;
use counsel_core::conversation::{Conversation, ConversationType};
use counsel_core::message::Message;

/// State owned by the session orchestrator.
///
/// Render components only ever see `&SessionState`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Newest first by creation time
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: Option<String>,
    /// Messages of the active conversation, in creation order
    pub messages: Vec<Message>,
    /// True while a chat turn is awaiting its reply
    pub pending: bool,
}

impl SessionState {
    pub fn find_conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_conversation_id
            .as_deref()
            .and_then(|id| self.find_conversation(id))
    }

    /// Type of the active conversation; `general` when it is not in the list.
    pub fn active_conversation_type(&self) -> ConversationType {
        self.active_conversation()
            .map(|c| c.conversation_type)
            .unwrap_or_default()
    }

    pub(crate) fn find_conversation_mut(&mut self, conversation_id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == conversation_id)
    }
}

/// A chat turn between the optimistic append and the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub turn: ChatTurn,
    /// Id of the optimistically appended user message
    pub user_message_id: String,
    /// True when the history held no user message before this one
    pub first_message: bool,
}

/// What a call to `send_message` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send: empty input, no active conversation, or no user
    Ignored,
    /// The backend replied and the reply was appended
    Replied,
    /// The call failed and the apology message was appended
    Failed,
}
