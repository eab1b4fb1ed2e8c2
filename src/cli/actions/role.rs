use crate::{
    cli::{actions::open_gate, globals::GlobalArgs},
    gate::role::SessionRole,
};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub role: SessionRole,
}

/// Execute the role action.
/// # Errors
/// Returns an error if the role cannot be persisted.
pub fn execute(args: &Args) -> Result<()> {
    let mut gate = open_gate(&args.globals)?;
    gate.set_role(args.role)?;

    println!("role: {}", gate.role());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::store::{ClientStore, FileStore, KEY_ROLE};

    #[test]
    fn role_is_written_to_state_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state.json");
        let args = Args {
            globals: GlobalArgs::new("http://localhost:8080".to_string(), path.clone()),
            role: SessionRole::Privileged,
        };

        execute(&args)?;

        let store = FileStore::open(&path)?;
        assert_eq!(store.get(KEY_ROLE).as_deref(), Some("admin"));
        Ok(())
    }
}
