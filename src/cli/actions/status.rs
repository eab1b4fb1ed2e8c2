use crate::cli::{actions::open_gate, globals::GlobalArgs};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Execute the status action.
/// # Errors
/// Returns an error if the state file cannot be opened.
pub fn execute(args: &Args) -> Result<()> {
    let gate = open_gate(&args.globals)?;

    println!("role: {}", gate.role());

    let lockout = gate.lockout();
    let status = lockout.check_lock();
    if status.locked {
        println!(
            "admin: locked ({}s remaining, {} failed attempts)",
            status.remaining.as_secs(),
            lockout.failure_count()
        );
    } else {
        println!("admin: unlocked ({} failed attempts)", lockout.failure_count());
    }

    let devices = gate.devices().devices();
    println!("trusted devices: {}", devices.len());
    for device in &devices {
        println!("  {} {}", device.id, device.created_at.to_rfc3339());
    }

    println!(
        "session token: {}",
        if gate.has_token() { "present" } else { "none" }
    );

    Ok(())
}
