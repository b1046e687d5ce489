//! Conversation type tag.
//!
//! The tag selects the legal-task context of a conversation and is forwarded
//! to the backend with every chat turn.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The closed set of legal-task contexts a conversation can run in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConversationType {
    #[default]
    General,
    ContractReview,
    LegalResearch,
    DocumentDrafting,
    Compliance,
    RiskAssessment,
}

impl ConversationType {
    /// Wire tag, e.g. `contract_review`.
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Human-readable label used by the starter menu.
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General Consultation",
            Self::ContractReview => "Contract Review",
            Self::LegalResearch => "Legal Research",
            Self::DocumentDrafting => "Document Drafting",
            Self::Compliance => "Compliance Check",
            Self::RiskAssessment => "Risk Assessment",
        }
    }

    /// Title given to a freshly created conversation of this type.
    ///
    /// Only the first underscore of the tag is replaced, so
    /// `contract_review` becomes `New contract review`.
    pub fn placeholder_title(&self) -> String {
        format!("New {}", self.as_str().replacen('_', " ", 1))
    }

    /// Whether conversations of this type expose the document upload control.
    pub fn accepts_documents(&self) -> bool {
        matches!(self, Self::ContractReview)
    }

    /// All variants in declaration order.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}
