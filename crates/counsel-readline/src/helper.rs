use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use counsel_core::chat::AnalysisType;
use counsel_core::conversation::ConversationType;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::COMMANDS;

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    /// Conversation type tags offered after `/new `
    types: Vec<String>,
    /// Analysis kinds offered after `/analyze `
    analyses: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
            types: ConversationType::all()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            analyses: AnalysisType::all()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        }
    }

    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        for (prefix, tags) in [("/new ", &self.types), ("/analyze ", &self.analyses)] {
            if let Some(partial) = line.strip_prefix(prefix) {
                let start = line.len() - partial.len();
                let matches = tags
                    .iter()
                    .filter(|t| t.starts_with(partial))
                    .cloned()
                    .collect();
                return (start, matches);
            }
        }
        if line.starts_with('/') && !line.contains(' ') {
            let matches = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .cloned()
                .collect();
            return (0, matches);
        }
        (0, vec![])
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|m| Pair {
                display: m.clone(),
                replacement: m,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        let (start, matches) = self.candidates(line);
        let typed = &line[start..];
        matches
            .into_iter()
            .find(|m| m.len() > typed.len())
            .map(|m| m[typed.len()..].to_string())
    }
}

impl Validator for CliHelper {}
