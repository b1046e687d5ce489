//! Configuration-based auth session.
//!
//! The real auth provider lives outside this client. This session serves the
//! user named in `config.toml` (or on the command line) and forgets it on
//! sign-out.

use async_trait::async_trait;
use counsel_core::config::UserSettings;
use counsel_core::error::{CounselError, Result};
use counsel_core::user::{AuthSession, User};
use std::sync::{Arc, RwLock};

/// Auth session backed by a statically configured user.
///
/// # Example
///
/// ```
/// use counsel_infrastructure::ConfigAuthSession;
/// use counsel_core::user::{AuthSession, User};
///
/// let session = ConfigAuthSession::new(Some(User::new("u1", "a@example.com")));
/// assert_eq!(session.current_user().map(|u| u.id), Some("u1".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct ConfigAuthSession {
    user: Arc<RwLock<Option<User>>>,
}

impl ConfigAuthSession {
    pub fn new(user: Option<User>) -> Self {
        Self {
            user: Arc::new(RwLock::new(user)),
        }
    }

    /// Builds a session from the `[user]` config section.
    pub fn from_settings(settings: Option<&UserSettings>) -> Self {
        Self::new(settings.map(|s| User::new(s.id.clone(), s.email.clone())))
    }
}

#[async_trait]
impl AuthSession for ConfigAuthSession {
    fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn sign_out(&self) -> Result<()> {
        let mut user = self.user.write().unwrap_or_else(|e| e.into_inner());
        match user.take() {
            Some(previous) => {
                tracing::info!("[Auth] Signed out {}", previous.email);
                Ok(())
            }
            None => Err(CounselError::Security("No user is signed in".to_string())),
        }
    }
}
