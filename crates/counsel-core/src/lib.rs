//! Domain layer for the Counsel legal-assistant client.
//!
//! Holds the data model (conversations, messages, users), the shared error
//! type, and the traits every external collaborator is reached through.

pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod message;
pub mod user;

// Re-export common error type
pub use error::{CounselError, Result};
