//! Provision command arguments

pub mod credentials;
pub mod handler;

pub use handler::handle_provision_command;

use clap::Args;
use std::path::PathBuf;

use crate::config::{Config, FailurePolicy};

/// Options for a provisioning run. Anything not given here falls back to
/// the config file, then to built-in defaults.
#[derive(Args, Debug, Default)]
pub struct ProvisionArgs {
    /// Spreadsheet with one node per row [default: add_nodes.xlsx]
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Sheet to read [default: Sheet1]
    #[arg(short, long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Orion server hostname or IP [default: orion]
    #[arg(long, value_name = "HOST")]
    pub server: Option<String>,

    /// Orion username (prompted for when not set)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// What to do when a row fails [default: abort]
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_error: Option<FailurePolicy>,

    /// Write per-row results to this file (.xlsx or .csv)
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Show the calls that would be made without contacting the server
    #[arg(long)]
    pub dry_run: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl ProvisionArgs {
    /// Command-line flags take priority over file and environment settings
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(file) = &self.file {
            config.batch.file = file.clone();
        }
        if let Some(sheet) = &self.sheet {
            config.batch.sheet = sheet.clone();
        }
        if let Some(server) = &self.server {
            config.server.host = server.clone();
        }
        if let Some(username) = &self.username {
            config.account.username = Some(username.clone());
        }
        if let Some(policy) = self.on_error {
            config.batch.on_error = policy;
        }
    }
}
