//! Infrastructure layer for Counsel: datastores, configuration, auth session.

pub mod auth_session;
pub mod config_service;
pub mod in_memory_datastore;
pub mod paths;
pub mod postgrest_datastore;

pub use crate::auth_session::ConfigAuthSession;
pub use crate::config_service::ConfigService;
pub use crate::in_memory_datastore::InMemoryDatastore;
pub use crate::postgrest_datastore::PostgrestDatastore;
