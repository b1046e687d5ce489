//! Backend interaction for Counsel.
//!
//! `BackendClient` implements the chat, upload and analysis traits from `counsel-core`
//! over HTTP; `document` prepares files for upload.

pub mod backend_client;
pub mod document;

pub use backend_client::BackendClient;
pub use document::{is_accepted_document, load_document};
