//! Application layer for Counsel.
//!
//! This crate coordinates the domain traits from `counsel-core` into the
//! session flow a front-end drives: loading conversations, opening one,
//! starting a new one, and exchanging chat turns with the backend.

pub mod session;

pub use session::{
    CHAT_FAILURE_MESSAGE, SendOutcome, SessionOrchestrator, SessionState, chat_failure_message,
};
