//! Session application services.
//!
//! This module contains the session state and the orchestrator that keeps it
//! in sync with the datastore and the chat backend.

mod orchestrator;
mod state;

pub use orchestrator::{
    CHAT_FAILURE_MESSAGE, SessionOrchestrator, TITLE_MAX_CHARS, chat_failure_message,
};
pub use state::{PendingTurn, SendOutcome, SessionState};
