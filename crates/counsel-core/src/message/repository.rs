//! Message repository trait.

use super::model::{Message, NewMessage};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract datastore for message rows.
///
/// Messages are written by the chat backend; the client reads them back when
/// a conversation is opened.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Lists the messages of a conversation, oldest first by creation time.
    async fn list_for_conversation(&self, conversation_id: &str) -> Result<Vec<Message>>;

    /// Inserts a message and returns the stored row.
    async fn insert(&self, message: &NewMessage) -> Result<Message>;
}
