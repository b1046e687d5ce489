//! Reading documents from disk for upload.

use counsel_core::chat::DocumentUpload;
use counsel_core::error::{CounselError, Result};
use std::path::Path;

/// File extensions the contract review upload accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Whether `path` has one of the accepted document extensions.
pub fn is_accepted_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

/// Loads `path` into a [`DocumentUpload`] addressed to the given conversation.
pub async fn load_document(
    path: &Path,
    user_id: &str,
    conversation_id: &str,
) -> Result<DocumentUpload> {
    if !is_accepted_document(path) {
        return Err(CounselError::io(format!(
            "Unsupported document type: {} (expected one of {})",
            path.display(),
            ACCEPTED_EXTENSIONS.join(", ")
        )));
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CounselError::io(format!("Invalid file name: {}", path.display())))?
        .to_string();

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        CounselError::io(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(DocumentUpload {
        file_name,
        mime_type,
        bytes,
        user_id: user_id.to_string(),
        conversation_id: conversation_id.to_string(),
    })
}
