//! Chat panel: transcript, input and the contract upload control.

use colored::Colorize;
use counsel_application::SessionState;
use counsel_core::chat::{
    AnalysisRequest, AnalysisType, DocumentAnalysis, DocumentAnalyzer, DocumentUploader,
};
use counsel_core::conversation::ConversationType;
use counsel_core::error::CounselError;
use counsel_core::message::{Message, MessageRole};
use counsel_core::user::User;
use counsel_interaction::load_document;
use std::fmt::Write;
use std::path::Path;

/// Outcome of a document upload, shown as a blocking notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgment {
    Uploaded { file_name: String },
    /// The backend (or the local file check) refused the document
    Rejected { detail: String },
    /// Transport failure; details are in the log
    Failed,
}

impl Acknowledgment {
    pub fn message(&self) -> String {
        match self {
            Self::Uploaded { file_name } => format!("File uploaded successfully: {}", file_name),
            Self::Rejected { detail } => format!("Upload failed: {}", detail),
            Self::Failed => "Upload failed. Check the log for details.".to_string(),
        }
    }
}

/// Outcome of an analysis request for the last uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Done(DocumentAnalysis),
    /// Nothing uploaded in this conversation yet, or the backend kept no id
    NoDocument,
    Rejected { detail: String },
    Failed,
}

/// The most recent successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub document_id: String,
    pub file_name: String,
    pub conversation_id: String,
}

const PENDING_INDICATOR: &str = "Assistant is thinking...";

#[derive(Debug, Default)]
pub struct ChatPanel {
    input: String,
    last_upload: Option<UploadedDocument>,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Takes the typed message for sending.
    ///
    /// Returns `None` for blank input or while a reply is pending. Otherwise
    /// the input is cleared before the trimmed text is returned.
    pub fn submit(&mut self, pending: bool) -> Option<String> {
        let content = self.input.trim();
        if content.is_empty() || pending {
            return None;
        }
        let content = content.to_string();
        self.input.clear();
        Some(content)
    }

    pub fn shows_upload_control(conversation_type: ConversationType) -> bool {
        conversation_type.accepts_documents()
    }

    pub fn render(&self, state: &SessionState) -> String {
        let mut out = String::new();

        let Some(conversation) = state.active_conversation() else {
            let _ = writeln!(
                out,
                "{}",
                "Select a conversation with /open <n> or start one with /new <type>.".bright_black()
            );
            return out;
        };

        let _ = writeln!(
            out,
            "{} {}",
            conversation.title.bold(),
            format!("[{}]", conversation.conversation_type.label()).bright_black()
        );
        if Self::shows_upload_control(state.active_conversation_type()) {
            let _ = writeln!(
                out,
                "{}",
                "Upload Contract Document (PDF or DOCX): /upload <path>".yellow()
            );
        }
        let _ = writeln!(out);

        if state.messages.is_empty() {
            let _ = writeln!(out, "{}", "How can I assist you today?".bold());
            let _ = writeln!(
                out,
                "{}",
                "Ask me about contracts, legal documents, compliance, or any legal questions you have."
                    .bright_black()
            );
            return out;
        }

        for message in &state.messages {
            out.push_str(&Self::render_message(message));
        }
        if state.pending {
            let _ = writeln!(out, "{}", PENDING_INDICATOR.bright_black());
        }
        out
    }

    /// One transcript block: author line, content, blank separator.
    pub fn render_message(message: &Message) -> String {
        let mut out = String::new();
        match message.role {
            MessageRole::User => {
                let _ = writeln!(out, "{}", "You".green().bold());
                for line in message.content.lines() {
                    let _ = writeln!(out, "{}", line.green());
                }
            }
            MessageRole::Assistant | MessageRole::System => {
                let _ = writeln!(out, "{}", "Assistant".bright_magenta().bold());
                for line in message.content.lines() {
                    let _ = writeln!(out, "{}", line.bright_blue());
                }
            }
        }
        let _ = writeln!(out);
        out
    }

    pub fn render_pending() -> String {
        format!("{}\n", PENDING_INDICATOR.bright_black())
    }

    pub fn render_analysis(analysis: &DocumentAnalysis, file_name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {}",
            analysis.analysis_type.label().bright_magenta().bold(),
            format!("({})", file_name).bright_black()
        );
        for line in analysis.analysis.lines() {
            let _ = writeln!(out, "{}", line.bright_blue());
        }
        let _ = writeln!(out);
        out
    }

    pub fn last_upload(&self) -> Option<&UploadedDocument> {
        self.last_upload.as_ref()
    }

    /// Uploads a document for the active conversation, outside the session state.
    ///
    /// A successful upload with a document id becomes the target of
    /// [`ChatPanel::analyze`].
    pub async fn upload(
        &mut self,
        path: &Path,
        uploader: &dyn DocumentUploader,
        user: &User,
        conversation_id: &str,
    ) -> Acknowledgment {
        let upload = match load_document(path, &user.id, conversation_id).await {
            Ok(upload) => upload,
            Err(e) => {
                tracing::warn!("[Upload] Could not read {}: {}", path.display(), e);
                return Acknowledgment::Rejected {
                    detail: e.to_string(),
                };
            }
        };

        match uploader.upload_document(upload).await {
            Ok(receipt) => {
                tracing::info!(
                    "[Upload] Uploaded {} to conversation {}",
                    receipt.file_name,
                    conversation_id
                );
                if let Some(document_id) = receipt.document_id {
                    self.last_upload = Some(UploadedDocument {
                        document_id,
                        file_name: receipt.file_name.clone(),
                        conversation_id: conversation_id.to_string(),
                    });
                }
                Acknowledgment::Uploaded {
                    file_name: receipt.file_name,
                }
            }
            Err(CounselError::Http { status, message }) => {
                tracing::warn!("[Upload] Backend rejected upload ({}): {}", status, message);
                Acknowledgment::Rejected { detail: message }
            }
            Err(e) => {
                tracing::error!("[Upload] Upload error: {}", e);
                Acknowledgment::Failed
            }
        }
    }

    /// Asks the backend to analyze the document last uploaded to `conversation_id`.
    pub async fn analyze(
        &self,
        analysis_type: AnalysisType,
        analyzer: &dyn DocumentAnalyzer,
        user: &User,
        conversation_id: &str,
    ) -> AnalysisOutcome {
        let Some(document) = self
            .last_upload
            .as_ref()
            .filter(|d| d.conversation_id == conversation_id)
        else {
            return AnalysisOutcome::NoDocument;
        };

        let request = AnalysisRequest {
            user_id: user.id.clone(),
            document_id: document.document_id.clone(),
            analysis_type,
        };
        match analyzer.analyze_document(&request).await {
            Ok(analysis) => AnalysisOutcome::Done(analysis),
            Err(CounselError::Http { status, message }) => {
                tracing::warn!("[Upload] Backend rejected analysis ({}): {}", status, message);
                AnalysisOutcome::Rejected { detail: message }
            }
            Err(e) => {
                tracing::error!("[Upload] Analysis error: {}", e);
                AnalysisOutcome::Failed
            }
        }
    }
}
