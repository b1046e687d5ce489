//! REPL line parsing.

use counsel_core::chat::AnalysisType;
use counsel_core::conversation::ConversationType;
use std::path::PathBuf;
use std::str::FromStr;

/// Slash commands, in the order `/help` lists them.
pub const COMMANDS: [(&str, &str); 10] = [
    ("/new", "/new <type>    start a conversation (general, contract_review, ...)"),
    ("/list", "/list          show your conversations"),
    ("/open", "/open <n>      open conversation number n from /list"),
    ("/upload", "/upload <path> upload a contract (contract review only)"),
    ("/analyze", "/analyze [kind] analyze the last uploaded contract (contract_review, ...)"),
    ("/documents", "/documents     list your uploaded documents"),
    ("/menu", "/menu          toggle the conversation menu"),
    ("/signout", "/signout       sign out and quit"),
    ("/help", "/help          show this help"),
    ("/quit", "/quit          exit"),
];

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    New(ConversationType),
    List,
    /// 1-based position in the conversation list
    Open(usize),
    Upload(PathBuf),
    Analyze(AnalysisType),
    Documents,
    Menu,
    SignOut,
    Help,
    Quit,
    /// Anything that is not a command is sent as a chat message
    Chat(String),
    /// A malformed command, with the message to show
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed == "quit" || trimmed == "exit" {
            return ReplCommand::Quit;
        }
        if !trimmed.starts_with('/') {
            return ReplCommand::Chat(trimmed.to_string());
        }

        let (name, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (trimmed, ""),
        };

        match name {
            "/new" => parse_new(arg),
            "/list" => ReplCommand::List,
            "/open" => match arg.parse::<usize>() {
                Ok(n) if n > 0 => ReplCommand::Open(n),
                _ => ReplCommand::Invalid("Usage: /open <n> (see /list)".to_string()),
            },
            "/upload" if arg.is_empty() => {
                ReplCommand::Invalid("Usage: /upload <path>".to_string())
            }
            "/upload" => ReplCommand::Upload(PathBuf::from(arg)),
            "/analyze" => parse_analyze(arg),
            "/documents" => ReplCommand::Documents,
            "/menu" => ReplCommand::Menu,
            "/signout" => ReplCommand::SignOut,
            "/help" => ReplCommand::Help,
            "/quit" | "/exit" => ReplCommand::Quit,
            other => ReplCommand::Invalid(format!("Unknown command: {} (try /help)", other)),
        }
    }
}

fn parse_new(arg: &str) -> ReplCommand {
    if arg.is_empty() {
        return ReplCommand::New(ConversationType::General);
    }
    // Accept "contract review" as well as "contract_review"
    let tag = arg.to_lowercase().replace([' ', '-'], "_");
    match ConversationType::from_str(&tag) {
        Ok(conversation_type) => ReplCommand::New(conversation_type),
        Err(_) => {
            let known: Vec<String> = ConversationType::all()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect();
            ReplCommand::Invalid(format!(
                "Unknown conversation type: {} (one of {})",
                arg,
                known.join(", ")
            ))
        }
    }
}

fn parse_analyze(arg: &str) -> ReplCommand {
    if arg.is_empty() {
        return ReplCommand::Analyze(AnalysisType::default());
    }
    let tag = arg.to_lowercase().replace([' ', '-'], "_");
    match AnalysisType::from_str(&tag) {
        Ok(analysis_type) => ReplCommand::Analyze(analysis_type),
        Err(_) => {
            let known: Vec<String> = AnalysisType::all()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect();
            ReplCommand::Invalid(format!(
                "Unknown analysis: {} (one of {})",
                arg,
                known.join(", ")
            ))
        }
    }
}
