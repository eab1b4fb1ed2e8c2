pub mod logging;
pub mod login;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STATE_FILE: &str = "state-file";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("dualgate")
        .about("Dual-role login client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .short('u')
                .long("api-url")
                .help("Base URL of the authentication API")
                .env("DUALGATE_API_URL")
                .global(true)
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_STATE_FILE)
                .short('s')
                .long("state-file")
                .help("File holding the persisted role, lockout state, trusted devices and token")
                .env("DUALGATE_STATE_FILE")
                .global(true)
                .default_value(".dualgate.json"),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .short('t')
                .long("timeout")
                .help("Request timeout in seconds")
                .env("DUALGATE_TIMEOUT")
                .global(true)
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .subcommand(login::subcommand())
        .subcommand(
            Command::new("status")
                .about("Show the selected role, admin lockout and trusted devices"),
        )
        .subcommand(
            Command::new("role")
                .about("Select and remember the role used by the next login")
                .arg(
                    Arg::new("role")
                        .help("Role to select")
                        .value_parser(["user", "admin"])
                        .required(true),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the stored session token"));

    logging::with_args(command)
}
