//! Auth session capability.
//!
//! The auth provider (login, token refresh) lives outside this client. What
//! the client needs is a handle that reports the current user and can end
//! the session; that handle is passed explicitly to whoever needs it.

use super::model::User;
use crate::error::Result;

/// Handle onto the signed-in user session.
///
/// # Implementation Notes
///
/// `current_user` must be cheap; it is consulted on every send.
#[async_trait::async_trait]
pub trait AuthSession: Send + Sync {
    /// Returns the signed-in user, or `None` after sign-out.
    fn current_user(&self) -> Option<User>;

    /// Ends the session. Afterwards `current_user` returns `None`.
    async fn sign_out(&self) -> Result<()>;
}
