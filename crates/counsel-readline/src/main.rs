use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use counsel_application::SessionOrchestrator;
use counsel_core::chat::ChatService;
use counsel_core::config::{DatastoreKind, RootConfig};
use counsel_core::conversation::ConversationRepository;
use counsel_core::message::MessageRepository;
use counsel_infrastructure::{ConfigAuthSession, ConfigService, InMemoryDatastore, PostgrestDatastore};
use counsel_interaction::BackendClient;

mod cli;
mod command;
mod helper;
mod logging;
mod panels;
mod repl;

use cli::Cli;
use command::ReplCommand;
use helper::CliHelper;
use panels::ConversationListPanel;
use repl::{Repl, Step};

/// Terminals narrower than this show the conversation list as an overlay.
const COMPACT_WIDTH: usize = 100;

fn load_config(cli: &Cli) -> Result<RootConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let mut config = service.get_config();
    cli.apply(&mut config);
    Ok(config)
}

type Datastores = (Arc<dyn ConversationRepository>, Arc<dyn MessageRepository>);

fn build_datastore(config: &RootConfig) -> Result<Datastores> {
    match config.datastore.kind {
        DatastoreKind::Memory => {
            tracing::info!("[Datastore] Using in-memory datastore");
            let store = Arc::new(InMemoryDatastore::new());
            let conversations: Arc<dyn ConversationRepository> = store.clone();
            let messages: Arc<dyn MessageRepository> = store;
            Ok((conversations, messages))
        }
        DatastoreKind::Postgrest => {
            let store = Arc::new(PostgrestDatastore::from_settings(&config.datastore)?);
            let conversations: Arc<dyn ConversationRepository> = store.clone();
            let messages: Arc<dyn MessageRepository> = store;
            Ok((conversations, messages))
        }
    }
}

fn is_compact_terminal() -> bool {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse::<usize>().ok())
        .map(|width| width < COMPACT_WIDTH)
        .unwrap_or(false)
}

/// Entry point for the `counsel` REPL.
///
/// Loads configuration, wires the datastore, backend client and auth session
/// into a session orchestrator, then reads lines until the user quits or
/// signs out.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let log_path = logging::init(&config.logging)?;
    tracing::info!("[Config] Starting counsel, logging to {}", log_path.display());

    let (conversations, messages) = build_datastore(&config)?;
    let backend = Arc::new(BackendClient::new(&config.backend.base_url));
    let auth = Arc::new(ConfigAuthSession::from_settings(config.user.as_ref()));

    match backend.backend_info().await {
        Ok(info) => tracing::info!(
            "[Backend] {} v{} at {}",
            info.message,
            info.version,
            backend.base_url()
        ),
        Err(e) => tracing::warn!("[Backend] Not reachable at {}: {}", backend.base_url(), e),
    }

    let session = SessionOrchestrator::new(conversations, messages, backend.clone(), auth)
        .with_backend_url(backend.base_url());
    if session.current_user().is_none() {
        eprintln!(
            "{}",
            "No user configured. Set [user] id in the config file or pass --user-id.".red()
        );
        return Ok(());
    }

    let mut repl = Repl::new(
        session,
        backend.clone(),
        backend,
        ConversationListPanel::new(is_compact_terminal()),
    );

    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Counsel ===".bright_magenta().bold());
    println!("{}", "Type /help for commands, or 'quit' to exit.".bright_black());
    println!();
    repl.start().await;

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match repl.handle(ReplCommand::parse(&line)).await {
                    Step::Continue => {}
                    Step::Notice(message) => {
                        println!("{}", message.bright_yellow());
                        // Blocks until acknowledged, like a modal alert
                        match rl.readline("Press Enter to continue ") {
                            Ok(_) | Err(ReadlineError::Interrupted) => {}
                            Err(_) => break,
                        }
                    }
                    Step::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                tracing::error!("[Repl] Readline error: {:?}", err);
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
