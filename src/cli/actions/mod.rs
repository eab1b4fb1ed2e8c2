pub mod login;
pub mod logout;
pub mod role;
pub mod status;

// Internal "interpreter" for `Action`.
mod run;

use crate::{
    api::HttpTransport,
    cli::globals::GlobalArgs,
    gate::{clock::SystemClock, store::FileStore, DualGate},
};
use anyhow::{Context, Result};

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Status(status::Args),
    Role(role::Args),
    Logout(logout::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

pub type CliGate = DualGate<FileStore, HttpTransport, SystemClock>;

/// Opens the state file and builds a gate against the configured API.
///
/// # Errors
/// Returns an error if the state file is unreadable or the API URL is invalid.
pub fn open_gate(globals: &GlobalArgs) -> Result<CliGate> {
    let store = FileStore::open(&globals.state_file).with_context(|| {
        format!(
            "Failed to open state file: {}",
            globals.state_file.display()
        )
    })?;
    let transport = HttpTransport::new(&globals.api_url, globals.timeout)
        .context("Failed to configure the authentication API client")?;

    Ok(DualGate::new(store, transport, SystemClock))
}
