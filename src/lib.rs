//! # dualgate (Dual-role login gate)
//!
//! `dualgate` implements the client side of a two-role login screen: a standard
//! user mode and a privileged admin mode that share one form.
//!
//! ## Roles
//!
//! The selected role decides which fields are required, which endpoint is called
//! and where a successful login lands. The last explicitly chosen role is
//! persisted; an email that looks like an admin address only raises a hint and
//! never switches the role on its own.
//!
//! ## Admin lockout
//!
//! Three consecutive rejected admin attempts lock admin mode for 15 minutes. The
//! lock expires lazily and is cleared by the next successful login. This runs
//! entirely in the client and is an anti-fumble affordance, **not** a security
//! boundary: real brute-force protection belongs to the server.
//!
//! ## Device trust
//!
//! A successful admin login with "trust this device" appends a device record to
//! an append-only list. Any stored record makes the device known.
//!
//! ## State
//!
//! All durable state goes through [`gate::store::ClientStore`], so the gate can
//! run against an in-memory map in tests or a JSON file on disk in the CLI.

pub mod api;
pub mod cli;
pub mod gate;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
