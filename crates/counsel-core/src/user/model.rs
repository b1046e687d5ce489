//! User domain model.

use serde::{Deserialize, Serialize};

/// The user the client is acting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier used as the owner of conversations
    pub id: String,
    /// Shown in the conversation list header
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}
