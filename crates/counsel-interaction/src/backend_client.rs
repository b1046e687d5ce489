//! BackendClient - HTTP client for the legal-assistant backend.
//!
//! Two calls matter to the client: `POST /api/chat` (one JSON turn, one JSON
//! reply) and `POST /api/upload-document` (multipart). Uploaded documents are
//! listed with `GET /api/documents/{user_id}` and analyzed with
//! `POST /api/analyze-document`. `GET /` is used as a reachability check at
//! start-up.

use async_trait::async_trait;
use counsel_core::chat::{
    AnalysisRequest, BackendInfo, ChatReply, ChatService, ChatTurn, Document, DocumentAnalysis,
    DocumentAnalyzer, DocumentUpload, DocumentUploader, UploadReceipt,
};
use counsel_core::config::DEFAULT_BACKEND_URL;
use counsel_core::error::{CounselError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;

const CHAT_PATH: &str = "/api/chat";
const UPLOAD_PATH: &str = "/api/upload-document";
const ANALYZE_PATH: &str = "/api/analyze-document";
const DOCUMENTS_PATH: &str = "/api/documents";
const UNKNOWN_ERROR: &str = "Unknown error";

/// Client for the chat backend.
///
/// No timeout is configured beyond reqwest's defaults and nothing is retried.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client for the backend at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        Err(CounselError::http(
            status.as_u16(),
            status.canonical_reason().unwrap_or("request failed"),
        ))
    }
}

impl Default for BackendClient {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

#[async_trait]
impl ChatService for BackendClient {
    async fn send_chat(&self, turn: &ChatTurn) -> Result<ChatReply> {
        tracing::debug!(
            "[Backend] Sending chat turn for conversation {} ({})",
            turn.conversation_id,
            turn.conversation_type
        );

        let response = self
            .client
            .post(self.url(CHAT_PATH))
            .json(turn)
            .send()
            .await
            .map_err(|err| CounselError::network(format!("Chat request failed: {err}")))?;

        let response = Self::ensure_success(response).await?;

        response
            .json::<ChatReply>()
            .await
            .map_err(|err| CounselError::network(format!("Failed to parse chat reply: {err}")))
    }

    async fn backend_info(&self) -> Result<BackendInfo> {
        let response = self
            .client
            .get(self.url("/"))
            .send()
            .await
            .map_err(|err| CounselError::network(format!("Backend check failed: {err}")))?;

        let response = Self::ensure_success(response).await?;

        response
            .json::<BackendInfo>()
            .await
            .map_err(|err| CounselError::network(format!("Failed to parse backend info: {err}")))
    }
}

#[async_trait]
impl DocumentUploader for BackendClient {
    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadReceipt> {
        let file_name = upload.file_name.clone();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(|err| CounselError::internal(format!("Invalid mime type: {err}")))?;

        let form = Form::new()
            .part("file", part)
            .text("user_id", upload.user_id)
            .text("conversation_id", upload.conversation_id);

        tracing::info!("[Backend] Uploading document {}", file_name);

        let response = self
            .client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|err| CounselError::network(format!("Upload request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| CounselError::network(format!("Failed to read upload response: {err}")))?;

        if !status.is_success() {
            return Err(map_detail_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DocumentAnalyzer for BackendClient {
    async fn analyze_document(&self, request: &AnalysisRequest) -> Result<DocumentAnalysis> {
        tracing::info!(
            "[Backend] Requesting {} analysis of document {}",
            request.analysis_type,
            request.document_id
        );

        let response = self
            .client
            .post(self.url(ANALYZE_PATH))
            .json(request)
            .send()
            .await
            .map_err(|err| CounselError::network(format!("Analysis request failed: {err}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            CounselError::network(format!("Failed to read analysis response: {err}"))
        })?;

        if !status.is_success() {
            return Err(map_detail_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>> {
        let response = self
            .client
            .get(self.url(&format!("{}/{}", DOCUMENTS_PATH, user_id)))
            .send()
            .await
            .map_err(|err| CounselError::network(format!("Document list request failed: {err}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            CounselError::network(format!("Failed to read document list: {err}"))
        })?;

        if !status.is_success() {
            return Err(map_detail_error(status.as_u16(), &body));
        }

        let list: DocumentList = serde_json::from_str(&body)?;
        tracing::debug!(
            "[Backend] Listed {} documents for user {}",
            list.documents.len(),
            user_id
        );
        Ok(list.documents)
    }
}

#[derive(Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
}

/// Maps a rejected request to `Http`, keeping the backend's `detail`.
fn map_detail_error(status: u16, body: &str) -> CounselError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|error| error.detail)
        .filter(|detail| !detail.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    CounselError::http(status, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_core::chat::AnalysisType;
    use counsel_core::conversation::ConversationType;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn turn() -> ChatTurn {
        ChatTurn {
            user_id: "u1".to_string(),
            conversation_id: "c1".to_string(),
            message: "What is force majeure?".to_string(),
            conversation_type: ConversationType::LegalResearch,
        }
    }

    fn upload() -> DocumentUpload {
        DocumentUpload {
            file_name: "nda.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4 test".to_vec(),
            user_id: "u1".to_string(),
            conversation_id: "c1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_chat_posts_turn_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({
                "user_id": "u1",
                "conversation_id": "c1",
                "message": "What is force majeure?",
                "conversation_type": "legal_research"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "conversation_id": "c1",
                "response": "Force majeure is ...",
                "timestamp": "2024-05-01T10:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let reply = client.send_chat(&turn()).await.expect("chat reply");

        assert_eq!(reply.response, "Force majeure is ...");
        assert_eq!(reply.conversation_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error_without_body_parsing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"detail": "crew exploded"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let err = client.send_chat(&turn()).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(!err.to_string().contains("crew exploded"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = BackendClient::new("http://127.0.0.1:9");
        let err = client.send_chat(&turn()).await.unwrap_err();
        assert!(matches!(err, CounselError::Network(_)));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload-document"))
            .and(body_string_contains("name=\"file\"; filename=\"nda.pdf\""))
            .and(body_string_contains("name=\"user_id\""))
            .and(body_string_contains("name=\"conversation_id\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "document_id": "d1",
                "file_name": "nda.pdf",
                "text": "test",
                "metadata": {"word_count": 1, "char_count": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let receipt = client.upload_document(upload()).await.expect("upload");

        assert_eq!(receipt.file_name, "nda.pdf");
        assert_eq!(receipt.document_id.as_deref(), Some("d1"));
    }

    #[tokio::test]
    async fn test_upload_failure_uses_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload-document"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"detail": "Unsupported file type"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let err = client.upload_document(upload()).await.unwrap_err();

        match err {
            CounselError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Unsupported file type");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upload_failure_without_detail() {
        let err = map_detail_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "HTTP 502: Unknown error");
    }

    #[tokio::test]
    async fn test_backend_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Legal AI Assistant API",
                "version": "1.0.0",
                "model": "groq/llama-3.3-70b-versatile"
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(format!("{}/", server.uri()));
        let info = client.backend_info().await.expect("backend info");
        assert_eq!(info.version, "1.0.0");
    }

    #[tokio::test]
    async fn test_analyze_document_posts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze-document"))
            .and(body_json(json!({
                "user_id": "u1",
                "document_id": "d1",
                "analysis_type": "contract_review"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "document_id": "d1",
                "analysis_type": "contract_review",
                "analysis": "Key terms: ...",
                "timestamp": "2024-05-01T10:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let analysis = client
            .analyze_document(&AnalysisRequest {
                user_id: "u1".to_string(),
                document_id: "d1".to_string(),
                analysis_type: AnalysisType::ContractReview,
            })
            .await
            .expect("analysis");

        assert_eq!(analysis.document_id, "d1");
        assert_eq!(analysis.analysis, "Key terms: ...");
    }

    #[tokio::test]
    async fn test_analyze_unknown_document_keeps_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze-document"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "Document not found"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let err = client
            .analyze_document(&AnalysisRequest {
                user_id: "u1".to_string(),
                document_id: "missing".to_string(),
                analysis_type: AnalysisType::ClauseExtraction,
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Document not found");
    }

    #[tokio::test]
    async fn test_list_documents_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/documents/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [{
                    "id": "d1",
                    "user_id": "u1",
                    "conversation_id": "c1",
                    "file_name": "msa.pdf",
                    "file_type": "application/pdf",
                    "file_size": 2048,
                    "storage_path": "u1/msa.pdf",
                    "processed": true,
                    "created_at": "2024-05-01T10:00:00+00:00"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let documents = client.list_documents("u1").await.expect("documents");

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file_name, "msa.pdf");
    }
}
