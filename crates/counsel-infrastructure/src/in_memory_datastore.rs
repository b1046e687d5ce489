//! In-memory datastore.
//!
//! Process-local implementation of both repositories. Used when the client
//! runs offline (`datastore.kind = "memory"`) and by tests.

use async_trait::async_trait;
use chrono::Utc;
use counsel_core::conversation::{Conversation, ConversationRepository, NewConversation};
use counsel_core::error::{CounselError, Result};
use counsel_core::message::{Message, MessageRepository, NewMessage};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    /// Insertion order
    conversations: Vec<Conversation>,
    /// Insertion order
    messages: Vec<Message>,
}

/// In-memory datastore for conversations and messages.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatastore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| CounselError::data_access(format!("Failed to lock datastore: {}", e)))
    }

    /// Number of stored conversation rows.
    pub fn conversation_count(&self) -> usize {
        self.lock().map(|t| t.conversations.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ConversationRepository for InMemoryDatastore {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let tables = self.lock()?;
        let mut rows: Vec<Conversation> = tables
            .conversations
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps later inserts first on equal timestamps
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert(&self, conversation: &NewConversation) -> Result<Conversation> {
        let now = Utc::now();
        let row = Conversation {
            id: Uuid::new_v4().to_string(),
            user_id: conversation.user_id.clone(),
            title: conversation.title.clone(),
            conversation_type: conversation.conversation_type,
            status: conversation.status,
            created_at: now,
            updated_at: now,
        };

        self.lock()?.conversations.push(row.clone());
        Ok(row)
    }

    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<()> {
        let mut tables = self.lock()?;
        let row = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| CounselError::not_found("Conversation", conversation_id))?;

        row.title = title.to_string();
        row.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryDatastore {
    async fn list_for_conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let tables = self.lock()?;
        let mut rows: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn insert(&self, message: &NewMessage) -> Result<Message> {
        let row = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: message.conversation_id.clone(),
            role: message.role,
            content: message.content.clone(),
            tokens_used: message.tokens_used,
            created_at: Utc::now(),
        };

        self.lock()?.messages.push(row.clone());
        Ok(row)
    }
}
