//! The interactive session: routes parsed lines to the panels and the orchestrator.

use colored::Colorize;
use counsel_application::{SendOutcome, SessionOrchestrator};
use counsel_core::chat::{AnalysisType, DocumentAnalyzer, DocumentUploader};
use counsel_core::error::Result;
use std::path::Path;
use std::sync::Arc;

use crate::command::{COMMANDS, ReplCommand};
use crate::panels::documents::render_documents;
use crate::panels::{AnalysisOutcome, ChatPanel, ConversationListPanel, PanelIntent};

const NOT_SIGNED_IN: &str = "Not signed in.";
const CONTRACT_REVIEW_ONLY: &str = "Open a contract review conversation first.";

/// What the REPL loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Show a notice and wait for Enter before reading the next line
    Notice(String),
    Quit,
}

/// Line shown after sign-out; the local session is gone either way.
pub fn sign_out_message(result: &Result<()>) -> String {
    match result {
        Ok(()) => "Signed out.".to_string(),
        Err(e) => format!("Signed out locally; the auth provider reported: {}", e),
    }
}

pub struct Repl {
    session: SessionOrchestrator,
    uploader: Arc<dyn DocumentUploader>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    chat: ChatPanel,
    list: ConversationListPanel,
}

impl Repl {
    pub fn new(
        session: SessionOrchestrator,
        uploader: Arc<dyn DocumentUploader>,
        analyzer: Arc<dyn DocumentAnalyzer>,
        list: ConversationListPanel,
    ) -> Self {
        Self {
            session,
            uploader,
            analyzer,
            chat: ChatPanel::new(),
            list,
        }
    }

    pub fn session(&self) -> &SessionOrchestrator {
        &self.session
    }

    /// Loads the conversation list and prints the opening screen.
    pub async fn start(&mut self) {
        self.session.load_conversations().await;
        self.print_list_if_visible();
        print!("{}", self.chat.render(self.session.state()));
    }

    pub async fn handle(&mut self, command: ReplCommand) -> Step {
        match command {
            ReplCommand::Chat(text) => {
                self.send(text).await;
                Step::Continue
            }
            ReplCommand::New(conversation_type) => match self.list.start(conversation_type) {
                Some(intent) => self.apply(intent).await,
                None => {
                    println!(
                        "{}",
                        format!("No starter for {}.", conversation_type.label()).yellow()
                    );
                    Step::Continue
                }
            },
            ReplCommand::Open(n) => {
                let intent = n
                    .checked_sub(1)
                    .and_then(|index| self.list.select(self.session.state(), index));
                match intent {
                    Some(intent) => return self.apply(intent).await,
                    None => println!("{}", format!("No conversation #{} (see /list)", n).yellow()),
                }
                Step::Continue
            }
            ReplCommand::List => {
                let user = self.session.current_user();
                print!("{}", self.list.render(self.session.state(), user.as_ref()));
                Step::Continue
            }
            ReplCommand::Menu => {
                self.list.toggle_overlay();
                if self.list.is_compact() && !self.list.is_visible() {
                    println!("{}", "Menu closed.".bright_black());
                } else {
                    self.print_list_if_visible();
                }
                Step::Continue
            }
            ReplCommand::Upload(path) => self.upload(&path).await,
            ReplCommand::Analyze(analysis_type) => self.analyze(analysis_type).await,
            ReplCommand::Documents => self.list_documents().await,
            ReplCommand::SignOut => {
                let intent = self.list.sign_out();
                self.apply(intent).await
            }
            ReplCommand::Help => {
                for (_, usage) in COMMANDS {
                    println!("{}", usage.bright_black());
                }
                println!("{}", "Anything else is sent to the assistant.".bright_black());
                Step::Continue
            }
            ReplCommand::Quit => Step::Quit,
            ReplCommand::Invalid(message) => {
                println!("{}", message.yellow());
                Step::Continue
            }
        }
    }

    async fn apply(&mut self, intent: PanelIntent) -> Step {
        match intent {
            PanelIntent::Select(id) => {
                self.session.select_conversation(&id).await;
                print!("{}", self.chat.render(self.session.state()));
                Step::Continue
            }
            PanelIntent::Create(conversation_type) => {
                if self.session.new_conversation(conversation_type).await.is_none() {
                    println!(
                        "{}",
                        "Could not create the conversation. Check the log for details.".red()
                    );
                }
                print!("{}", self.chat.render(self.session.state()));
                Step::Continue
            }
            PanelIntent::SignOut => {
                let result = self.session.sign_out().await;
                let message = sign_out_message(&result);
                if result.is_ok() {
                    println!("{}", message.bright_green());
                } else {
                    println!("{}", message.yellow());
                }
                Step::Quit
            }
        }
    }

    async fn send(&mut self, text: String) {
        self.chat.set_input(text);
        let Some(content) = self.chat.submit(self.session.state().pending) else {
            return;
        };
        let Some(pending) = self.session.begin_send(&content) else {
            if let Some(reason) = self.send_blocker() {
                println!("{}", reason.yellow());
            }
            return;
        };

        // The optimistic message is on screen before the request goes out
        if let Some(message) = self.session.state().messages.last() {
            print!("{}", ChatPanel::render_message(message));
        }
        print!("{}", ChatPanel::render_pending());

        let result = self.session.request_reply(&pending).await;
        let outcome = self.session.complete_send(pending, result).await;
        if outcome != SendOutcome::Ignored {
            if let Some(message) = self.session.state().messages.last() {
                print!("{}", ChatPanel::render_message(message));
            }
        }
    }

    /// Why a message cannot be sent right now, if the reason is one the user can fix.
    fn send_blocker(&self) -> Option<&'static str> {
        if self.session.current_user().is_none() {
            Some(NOT_SIGNED_IN)
        } else if self.session.state().active_conversation_id.is_none() {
            Some("Start a conversation with /new <type> or open one with /open <n> first.")
        } else {
            None
        }
    }

    async fn upload(&mut self, path: &Path) -> Step {
        let state = self.session.state();
        let Some(conversation_id) = state.active_conversation_id.clone() else {
            return Step::Notice(CONTRACT_REVIEW_ONLY.to_string());
        };
        if !ChatPanel::shows_upload_control(state.active_conversation_type()) {
            return Step::Notice(
                "Uploads are only available in contract review conversations.".to_string(),
            );
        }
        let Some(user) = self.session.current_user() else {
            return Step::Notice(NOT_SIGNED_IN.to_string());
        };

        let ack = self
            .chat
            .upload(path, self.uploader.as_ref(), &user, &conversation_id)
            .await;
        Step::Notice(ack.message())
    }

    async fn analyze(&mut self, analysis_type: AnalysisType) -> Step {
        let state = self.session.state();
        let Some(conversation_id) = state.active_conversation_id.clone() else {
            return Step::Notice(CONTRACT_REVIEW_ONLY.to_string());
        };
        if !ChatPanel::shows_upload_control(state.active_conversation_type()) {
            return Step::Notice(
                "Analysis is only available in contract review conversations.".to_string(),
            );
        }
        let Some(user) = self.session.current_user() else {
            return Step::Notice(NOT_SIGNED_IN.to_string());
        };

        println!(
            "{}",
            format!("Running {} analysis...", analysis_type.label()).bright_black()
        );
        let outcome = self
            .chat
            .analyze(analysis_type, self.analyzer.as_ref(), &user, &conversation_id)
            .await;
        match outcome {
            AnalysisOutcome::Done(analysis) => {
                let file_name = self
                    .chat
                    .last_upload()
                    .map(|d| d.file_name.as_str())
                    .unwrap_or_default();
                print!("{}", ChatPanel::render_analysis(&analysis, file_name));
                Step::Continue
            }
            AnalysisOutcome::NoDocument => {
                Step::Notice("Upload a contract with /upload <path> first.".to_string())
            }
            AnalysisOutcome::Rejected { detail } => {
                Step::Notice(format!("Analysis failed: {}", detail))
            }
            AnalysisOutcome::Failed => {
                Step::Notice("Analysis failed. Check the log for details.".to_string())
            }
        }
    }

    async fn list_documents(&mut self) -> Step {
        let Some(user) = self.session.current_user() else {
            return Step::Notice(NOT_SIGNED_IN.to_string());
        };

        match self.analyzer.list_documents(&user.id).await {
            Ok(documents) => {
                print!("{}", render_documents(&documents));
                Step::Continue
            }
            Err(e) => {
                tracing::warn!("[Upload] Failed to list documents: {}", e);
                Step::Notice("Could not load your documents. Check the log for details.".to_string())
            }
        }
    }

    fn print_list_if_visible(&self) {
        if self.list.is_visible() {
            let user = self.session.current_user();
            print!("{}", self.list.render(self.session.state(), user.as_ref()));
        }
    }
}
