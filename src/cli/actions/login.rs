use crate::{
    cli::{actions::open_gate, globals::GlobalArgs},
    gate::{credentials::Credentials, role::SessionRole},
};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub role: Option<SessionRole>,
    pub remember_me: bool,
    pub two_factor_code: String,
    pub security_question: String,
    pub security_answer: SecretString,
    pub trust_device: bool,
}

impl Args {
    fn into_credentials(self, role: SessionRole) -> Credentials {
        match role {
            SessionRole::Standard => Credentials::Standard {
                email: self.email,
                password: self.password,
                remember_me: self.remember_me,
            },
            SessionRole::Privileged => Credentials::Privileged {
                email: self.email,
                password: self.password,
                two_factor_code: self.two_factor_code,
                security_question: self.security_question,
                security_answer: self.security_answer,
                trust_device: self.trust_device,
            },
        }
    }
}

/// Execute the login action.
/// # Errors
/// Returns an error if the state file cannot be used or the login is refused.
pub async fn execute(args: Args) -> Result<()> {
    let mut gate = open_gate(&args.globals)?;

    if let Some(role) = args.role {
        gate.set_role(role)?;
    }
    let role = gate.role();
    debug!(%role, "selected role");

    gate.update_email(&args.email);
    if gate.admin_hint() {
        println!("Hint: this looks like an admin account. Use `--role admin` to sign in as admin.");
    }

    let credentials = args.into_credentials(role);
    let outcome = gate.submit(&credentials).await?;

    println!("Signed in as {} -> {}", outcome.role, outcome.landing);
    if let Some(device) = outcome.trusted_device {
        println!("Device trusted: {}", device.id);
    }
    if !outcome.token_persisted {
        println!("The server did not issue a session token.");
    }

    Ok(())
}
