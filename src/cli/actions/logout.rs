use crate::cli::{actions::open_gate, globals::GlobalArgs};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Execute the logout action.
/// # Errors
/// Returns an error if the token cannot be removed.
pub fn execute(args: &Args) -> Result<()> {
    let gate = open_gate(&args.globals)?;
    if gate.has_token() {
        gate.clear_token()?;
        println!("Signed out.");
    } else {
        println!("No session token stored.");
    }
    Ok(())
}
