use crate::cli::actions::{login, logout, role, status, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Status(args) => status::execute(&args),
        Action::Role(args) => role::execute(&args),
        Action::Logout(args) => logout::execute(&args),
    }
}
