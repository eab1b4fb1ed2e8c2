//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an [`Action`] carrying everything the action
//! needs, so actions never touch `clap` directly.

use crate::cli::{
    actions::{login, logout, role, status, Action},
    commands::{self, login as login_args},
    globals::GlobalArgs,
};
use crate::gate::role::SessionRole;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    match matches.subcommand() {
        Some(("login", sub)) => Ok(Action::Login(login_options(sub, globals)?)),
        Some(("status", _)) => Ok(Action::Status(status::Args { globals })),
        Some(("role", sub)) => {
            let role = sub
                .get_one::<String>("role")
                .context("missing required argument: role")?
                .parse::<SessionRole>()?;
            Ok(Action::Role(role::Args { globals, role }))
        }
        Some(("logout", _)) => Ok(Action::Logout(logout::Args { globals })),
        Some((other, _)) => Err(anyhow!("unknown subcommand: {other}")),
        None => Err(anyhow!("missing subcommand")),
    }
}

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>(commands::ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;
    let state_file = matches
        .get_one::<String>(commands::ARG_STATE_FILE)
        .map(PathBuf::from)
        .context("missing required argument: --state-file")?;

    let mut globals = GlobalArgs::new(api_url, state_file);
    if let Some(seconds) = matches.get_one::<u64>(commands::ARG_TIMEOUT) {
        globals.set_timeout(Duration::from_secs(*seconds));
    }
    Ok(globals)
}

fn login_options(sub: &clap::ArgMatches, globals: GlobalArgs) -> Result<login::Args> {
    let email = sub
        .get_one::<String>(login_args::ARG_EMAIL)
        .cloned()
        .context("missing required argument: --email")?;
    let password = sub
        .get_one::<String>(login_args::ARG_PASSWORD)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --password")?;
    let role = sub
        .get_one::<String>(login_args::ARG_ROLE)
        .map(|role| role.parse::<SessionRole>())
        .transpose()?;

    Ok(login::Args {
        globals,
        email,
        password,
        role,
        remember_me: sub.get_flag(login_args::ARG_REMEMBER_ME),
        two_factor_code: sub
            .get_one::<String>(login_args::ARG_CODE)
            .cloned()
            .unwrap_or_default(),
        security_question: sub
            .get_one::<String>(login_args::ARG_SECURITY_QUESTION)
            .cloned()
            .unwrap_or_default(),
        security_answer: SecretString::from(
            sub.get_one::<String>(login_args::ARG_SECURITY_ANSWER)
                .cloned()
                .unwrap_or_default(),
        ),
        trust_device: sub.get_flag(login_args::ARG_TRUST_DEVICE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(
            [
                ("DUALGATE_API_URL", None::<&str>),
                ("DUALGATE_STATE_FILE", None),
                ("DUALGATE_TIMEOUT", None),
                ("DUALGATE_EMAIL", None),
                ("DUALGATE_PASSWORD", None),
                ("DUALGATE_SECURITY_ANSWER", None),
            ],
            f,
        );
    }

    #[test]
    fn login_action_from_args() {
        clean_env(|| {
            let matches = commands::new().get_matches_from(vec![
                "dualgate",
                "--timeout",
                "5",
                "login",
                "--email",
                "jane@example.com",
                "--password",
                "s3cret",
                "--remember-me",
            ]);

            let Ok(Action::Login(args)) = handler(&matches) else {
                panic!("expected login action");
            };
            assert_eq!(args.globals.api_url, "http://localhost:8080");
            assert_eq!(args.globals.state_file, PathBuf::from(".dualgate.json"));
            assert_eq!(args.globals.timeout, Duration::from_secs(5));
            assert_eq!(args.email, "jane@example.com");
            assert_eq!(args.password.expose_secret(), "s3cret");
            assert!(args.role.is_none());
            assert!(args.remember_me);
            assert!(args.two_factor_code.is_empty());
        });
    }

    #[test]
    fn role_action_from_args() {
        clean_env(|| {
            let matches = commands::new().get_matches_from(vec!["dualgate", "role", "admin"]);
            let Ok(Action::Role(args)) = handler(&matches) else {
                panic!("expected role action");
            };
            assert_eq!(args.role, SessionRole::Privileged);
        });
    }

    #[test]
    fn status_and_logout_actions() {
        clean_env(|| {
            let matches = commands::new().get_matches_from(vec!["dualgate", "status"]);
            assert!(matches!(handler(&matches), Ok(Action::Status(_))));

            let matches = commands::new().get_matches_from(vec!["dualgate", "logout"]);
            assert!(matches!(handler(&matches), Ok(Action::Logout(_))));
        });
    }
}
