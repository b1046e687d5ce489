//! Conversation domain model.

use super::kind::ConversationType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle tag stored alongside a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    #[default]
    Active,
    Archived,
}

/// A conversation row as stored in the datastore.
///
/// The title starts out as the placeholder for its type and is replaced once
/// by the session orchestrator, from the first message the user sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Datastore-assigned identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display title
    pub title: String,
    pub conversation_type: ConversationType,
    #[serde(default)]
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// True while the title is still the auto-generated `New <type>` form.
    pub fn has_placeholder_title(&self) -> bool {
        self.title == self.conversation_type.placeholder_title()
    }
}

/// Insert payload for a new conversation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConversation {
    pub user_id: String,
    pub title: String,
    pub conversation_type: ConversationType,
    pub status: ConversationStatus,
}

impl NewConversation {
    /// Builds the row a starter action creates: placeholder title, active status.
    pub fn for_type(user_id: impl Into<String>, conversation_type: ConversationType) -> Self {
        Self {
            user_id: user_id.into(),
            title: conversation_type.placeholder_title(),
            conversation_type,
            status: ConversationStatus::Active,
        }
    }
}
