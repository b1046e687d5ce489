//! Stored documents and backend analysis of them.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Kind of analysis the backend runs over an uploaded document.
///
/// The backend has dedicated prompts for contract review and clause
/// extraction; every other kind gets its general document analysis.
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
pub enum AnalysisType {
    #[default]
    ContractReview,
    ClauseExtraction,
    RiskAssessment,
    ComplianceCheck,
    DocumentAnalysis,
}

impl AnalysisType {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ContractReview => "Contract Review",
            Self::ClauseExtraction => "Clause Extraction",
            Self::RiskAssessment => "Risk Assessment",
            Self::ComplianceCheck => "Compliance Check",
            Self::DocumentAnalysis => "Document Analysis",
        }
    }
}

/// A document row the backend stored on upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    /// MIME type reported at upload
    #[serde(default)]
    pub file_type: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for one document analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub user_id: String,
    pub document_id: String,
    pub analysis_type: AnalysisType,
}

/// The backend's analysis of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub document_id: String,
    pub analysis_type: AnalysisType,
    /// Generated analysis text
    pub analysis: String,
    /// Backend timestamp (ISO 8601)
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Lists uploaded documents and requests analyses of them.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Runs one analysis over a stored document.
    ///
    /// A rejected request is `CounselError::Http` carrying the backend's
    /// `detail` (`"Document not found"` for an unknown id).
    async fn analyze_document(&self, request: &AnalysisRequest) -> Result<DocumentAnalysis>;

    /// Documents the user has uploaded, as the backend returns them.
    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_analysis_type_tags() {
        assert_eq!(AnalysisType::ClauseExtraction.as_str(), "clause_extraction");
        assert_eq!(
            AnalysisType::from_str("risk_assessment").unwrap(),
            AnalysisType::RiskAssessment
        );
        assert!(AnalysisType::from_str("summary").is_err());
    }

    #[test]
    fn test_document_row_ignores_storage_columns() {
        let document: Document = serde_json::from_str(
            r#"{
                "id": "d1",
                "user_id": "u1",
                "conversation_id": "c1",
                "file_name": "msa.pdf",
                "file_type": "application/pdf",
                "file_size": 2048,
                "storage_path": "u1/msa.pdf",
                "processed": true,
                "metadata": {"word_count": 300},
                "created_at": "2024-05-01T10:00:00+00:00"
            }"#,
        )
        .unwrap();

        assert_eq!(document.file_name, "msa.pdf");
        assert_eq!(document.file_size, Some(2048));
        assert!(document.processed);
    }

    #[test]
    fn test_analysis_response() {
        let analysis: DocumentAnalysis = serde_json::from_str(
            r#"{
                "document_id": "d1",
                "analysis_type": "contract_review",
                "analysis": "1. Key Terms...",
                "timestamp": "2024-05-01T10:00:00"
            }"#,
        )
        .unwrap();

        assert_eq!(analysis.analysis_type, AnalysisType::ContractReview);
        assert!(analysis.analysis.starts_with("1. Key Terms"));
    }
}
