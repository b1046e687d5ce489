//! Message domain module.

mod model;
mod repository;

pub use model::{Message, MessageRole, NewMessage};
pub use repository::MessageRepository;
