//! Chat backend contract.
//!
//! The chat backend turns one user message into one generated reply and
//! accepts contract documents for later review. This module holds the
//! request/response types and the traits the client talks through.

mod analysis;

pub use analysis::{AnalysisRequest, AnalysisType, Document, DocumentAnalysis, DocumentAnalyzer};

use crate::conversation::ConversationType;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One chat turn sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user_id: String,
    pub conversation_id: String,
    pub message: String,
    pub conversation_type: ConversationType,
}

/// The backend's answer to a [`ChatTurn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated reply text
    pub response: String,
    /// Conversation the backend stored the turn under
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Backend timestamp (ISO 8601)
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A document picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub user_id: String,
    pub conversation_id: String,
}

/// Text statistics the backend extracts from an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub word_count: u64,
    pub char_count: u64,
}

/// Successful upload acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub file_name: String,
    #[serde(default)]
    pub document_id: Option<String>,
    /// Text extracted by the backend
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: Option<UploadMetadata>,
}

/// Identification the backend serves on its root endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub message: String,
    pub version: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Generates replies for chat turns.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Sends one turn and waits for the generated reply.
    ///
    /// Any non-success status is an error; the error body is not interpreted.
    async fn send_chat(&self, turn: &ChatTurn) -> Result<ChatReply>;

    /// Fetches the backend's self-description; used as a reachability check.
    async fn backend_info(&self) -> Result<BackendInfo>;
}

/// Accepts documents for contract review.
#[async_trait]
pub trait DocumentUploader: Send + Sync {
    /// Uploads a document.
    ///
    /// On a rejected upload the error is `CounselError::Http` whose message
    /// is the backend's `detail`, or `"Unknown error"` when it sent none.
    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadReceipt>;
}
