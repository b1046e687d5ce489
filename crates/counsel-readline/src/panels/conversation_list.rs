//! Conversation list panel: header, starter menu, history and sign-out.

use colored::Colorize;
use counsel_application::SessionState;
use counsel_core::conversation::ConversationType;
use counsel_core::user::User;
use std::fmt::Write;

/// What the user asked the list panel to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelIntent {
    Select(String),
    Create(ConversationType),
    SignOut,
}

/// Types offered as starter actions, in menu order.
///
/// `document_drafting` has no starter; existing conversations of that type
/// still list and open normally.
pub const STARTERS: [ConversationType; 5] = [
    ConversationType::General,
    ConversationType::ContractReview,
    ConversationType::LegalResearch,
    ConversationType::Compliance,
    ConversationType::RiskAssessment,
];

pub struct ConversationListPanel {
    /// Narrow terminal: the list is an overlay instead of always shown
    compact: bool,
    overlay_open: bool,
}

impl ConversationListPanel {
    pub fn new(compact: bool) -> Self {
        Self {
            compact,
            overlay_open: false,
        }
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// Whether the list is currently on screen.
    pub fn is_visible(&self) -> bool {
        !self.compact || self.overlay_open
    }

    pub fn toggle_overlay(&mut self) {
        if self.compact {
            self.overlay_open = !self.overlay_open;
        }
    }

    fn collapse(&mut self) {
        self.overlay_open = false;
    }

    /// Selects the conversation at `index` (0-based) in the listed order.
    pub fn select(&mut self, state: &SessionState, index: usize) -> Option<PanelIntent> {
        let conversation = state.conversations.get(index)?;
        self.collapse();
        Some(PanelIntent::Select(conversation.id.clone()))
    }

    /// Starts a conversation of a starter type. Types without a starter yield `None`.
    pub fn start(&mut self, conversation_type: ConversationType) -> Option<PanelIntent> {
        if !STARTERS.contains(&conversation_type) {
            return None;
        }
        self.collapse();
        Some(PanelIntent::Create(conversation_type))
    }

    pub fn sign_out(&self) -> PanelIntent {
        PanelIntent::SignOut
    }

    pub fn render(&self, state: &SessionState, user: Option<&User>) -> String {
        let mut out = String::new();
        let email = user.map(|u| u.email.as_str()).unwrap_or("");
        let _ = writeln!(out, "{}  {}", "Legal AI".bold(), email.bright_black());

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "New conversation".bright_black());
        for conversation_type in STARTERS {
            let _ = writeln!(
                out,
                "  + {:<22} {}",
                conversation_type.label(),
                format!("/new {}", conversation_type).bright_black()
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "RECENT CONVERSATIONS".bright_black());
        if state.conversations.is_empty() {
            let _ = writeln!(out, "  {}", "No conversations yet".bright_black());
        }
        for (i, conversation) in state.conversations.iter().enumerate() {
            let active = state.active_conversation_id.as_deref() == Some(conversation.id.as_str());
            let line = format!(
                "{:>3}. {} [{}]",
                i + 1,
                conversation.title,
                conversation.conversation_type.label()
            );
            if active {
                let _ = writeln!(out, "{}", format!("> {}", line).bright_cyan().bold());
            } else {
                let _ = writeln!(out, "  {}", line);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Sign Out  /signout".bright_black());
        out
    }
}
