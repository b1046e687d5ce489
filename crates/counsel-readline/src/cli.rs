use clap::Parser;
use counsel_core::config::{DatastoreKind, RootConfig, UserSettings};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "counsel")]
#[command(about = "Counsel - terminal client for the legal assistant", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.config/counsel/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chat backend base URL
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Id of the signed-in user
    #[arg(long)]
    pub user_id: Option<String>,

    /// Email shown in the conversation list header
    #[arg(long)]
    pub email: Option<String>,

    /// Keep conversations in memory instead of the remote datastore
    #[arg(long)]
    pub offline: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration.
    pub fn apply(&self, config: &mut RootConfig) {
        if let Some(url) = &self.backend_url {
            config.backend.base_url = url.clone();
        }
        if self.offline {
            config.datastore.kind = DatastoreKind::Memory;
        }

        match (&self.user_id, &mut config.user) {
            (Some(id), Some(user)) => user.id = id.clone(),
            (Some(id), None) => {
                config.user = Some(UserSettings {
                    id: id.clone(),
                    email: String::new(),
                })
            }
            _ => {}
        }
        if let (Some(email), Some(user)) = (&self.email, &mut config.user) {
            user.email = email.clone();
        }
    }
}
