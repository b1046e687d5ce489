//! Terminal renditions of the two client panels.
//!
//! Panels render from a read-only `&SessionState` and hand intents back to
//! the REPL, which forwards them to the session orchestrator.

pub mod chat;
pub mod conversation_list;
pub mod documents;

pub use chat::{Acknowledgment, AnalysisOutcome, ChatPanel};
pub use conversation_list::{ConversationListPanel, PanelIntent, STARTERS};
