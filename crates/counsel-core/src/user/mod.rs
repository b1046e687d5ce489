//! User domain module.
//!
//! This module contains the signed-in user and the auth session capability
//! that hands it out.
//!
//! # Module Structure
//!
//! - `model`: User domain model
//! - `service`: Auth session trait
//!
//! # Usage
//!
//! ```ignore
//! use counsel_core::user::{AuthSession, User};
//! ```

mod model;
mod service;

// Re-export public API
pub use model::User;
pub use service::AuthSession;
