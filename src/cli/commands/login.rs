use clap::{Arg, ArgAction, Command};

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_ROLE: &str = "role";
pub const ARG_REMEMBER_ME: &str = "remember-me";
pub const ARG_CODE: &str = "code";
pub const ARG_SECURITY_QUESTION: &str = "security-question";
pub const ARG_SECURITY_ANSWER: &str = "security-answer";
pub const ARG_TRUST_DEVICE: &str = "trust-device";

#[must_use]
pub fn subcommand() -> Command {
    Command::new("login")
        .about("Sign in as a user or an admin")
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long("email")
                .help("Account email")
                .env("DUALGATE_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long("password")
                .help(
                    "Account password. Prefer DUALGATE_PASSWORD: command-line arguments \
                     are visible to other users in the process list",
                )
                .env("DUALGATE_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ROLE)
                .short('r')
                .long("role")
                .help("Role to sign in as (defaults to the last selected role)")
                .value_parser(["user", "admin"]),
        )
        .arg(
            Arg::new(ARG_REMEMBER_ME)
                .long("remember-me")
                .help("Ask the server for a long-lived session (user role)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_CODE)
                .short('c')
                .long("code")
                .help("6-digit authenticator code (admin role)"),
        )
        .arg(
            Arg::new(ARG_SECURITY_QUESTION)
                .long("security-question")
                .help("Security question id (admin role)"),
        )
        .arg(
            Arg::new(ARG_SECURITY_ANSWER)
                .long("security-answer")
                .help(
                    "Answer to the security question (admin role). Prefer \
                     DUALGATE_SECURITY_ANSWER over the flag",
                )
                .env("DUALGATE_SECURITY_ANSWER")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TRUST_DEVICE)
                .long("trust-device")
                .help("Remember this device after a successful admin login")
                .action(ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn help_of(id: &str) -> String {
        subcommand()
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .and_then(Arg::get_help)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    #[test]
    fn secret_flags_point_at_env_vars() {
        assert!(help_of(ARG_PASSWORD).contains("DUALGATE_PASSWORD"));
        assert!(help_of(ARG_PASSWORD).contains("process list"));
        assert!(help_of(ARG_SECURITY_ANSWER).contains("DUALGATE_SECURITY_ANSWER"));
    }

    #[test]
    fn password_comes_from_env() {
        temp_env::with_vars([("DUALGATE_PASSWORD", Some("from-env"))], || {
            let matches = subcommand().get_matches_from(vec!["login", "-e", "jane@example.com"]);
            assert_eq!(
                matches.get_one::<String>(ARG_PASSWORD).map(String::as_str),
                Some("from-env")
            );
        });
    }
}
