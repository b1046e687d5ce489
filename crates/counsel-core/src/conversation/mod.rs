//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `kind`: the conversation type tag
//! - `model`: conversation rows and insert payloads
//! - `repository`: datastore trait for the `conversations` relation

mod kind;
mod model;
mod repository;

pub use kind::ConversationType;
pub use model::{Conversation, ConversationStatus, NewConversation};
pub use repository::ConversationRepository;
