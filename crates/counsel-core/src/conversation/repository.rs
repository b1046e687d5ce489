//! Conversation repository trait.
//!
//! Defines the datastore operations the client needs over the
//! `conversations` relation.

use super::model::{Conversation, NewConversation};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract datastore for conversation rows.
///
/// This trait decouples the session orchestrator from the concrete datastore
/// (REST backend, in-memory, ...).
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Lists every conversation owned by `user_id`, newest first by creation time.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>>;

    /// Inserts a conversation and returns the stored row with its assigned id.
    async fn insert(&self, conversation: &NewConversation) -> Result<Conversation>;

    /// Replaces the title of the conversation with the given id.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Title updated
    /// - `Err(CounselError::NotFound)`: No such conversation (implementations that can tell)
    /// - `Err(_)`: Datastore failure
    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<()>;
}
