//! Dual-role login gate.
//!
//! [`DualGate`] owns the role selection and coordinates the lockout guard, the
//! device trust list and the transport for one submit at a time. `submit` takes
//! `&mut self`, so a single gate never has two logins in flight.

pub mod clock;
pub mod credentials;
pub mod devices;
pub mod lockout;
pub mod role;
pub mod store;

use self::{
    clock::Clock,
    credentials::{Credentials, ValidationError},
    devices::{DeviceTrustStore, TrustedDevice},
    lockout::{LockStatus, LockoutGuard},
    role::{RoleSelector, SessionRole},
    store::{ClientStore, StoreError, KEY_AUTH_TOKEN},
};
use crate::api::{AuthTransport, LoginReply};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

const GENERIC_REJECTION: &str = "Invalid credentials.";

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Too many failed attempts. Try again in {} minutes.", minutes_ceil(.remaining))]
    LockedOut { remaining: Duration },
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Unable to reach the server. Please try again.")]
    Transport(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn minutes_ceil(remaining: &Duration) -> u64 {
    remaining.as_secs().div_ceil(60).max(1)
}

/// What a successful login produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub role: SessionRole,
    pub landing: &'static str,
    pub token_persisted: bool,
    pub trusted_device: Option<TrustedDevice>,
}

#[derive(Debug)]
pub struct DualGate<S, T, C> {
    store: S,
    transport: T,
    clock: C,
    selector: RoleSelector,
}

impl<S: ClientStore, T: AuthTransport, C: Clock> DualGate<S, T, C> {
    /// Builds a gate and restores the persisted role.
    pub fn new(store: S, transport: T, clock: C) -> Self {
        let selector = RoleSelector::load_persisted(&store);
        Self {
            store,
            transport,
            clock,
            selector,
        }
    }

    #[must_use]
    pub const fn role(&self) -> SessionRole {
        self.selector.role()
    }

    #[must_use]
    pub const fn admin_hint(&self) -> bool {
        self.selector.admin_hint()
    }

    /// Message of the last failed submit, cleared by any role change.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.selector.error()
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Explicit role choice; always persisted.
    ///
    /// # Errors
    /// Returns an error if the role cannot be persisted.
    pub fn set_role(&mut self, role: SessionRole) -> Result<(), StoreError> {
        self.selector.set_role(&self.store, role, true)
    }

    /// Re-evaluates the admin hint; suppressed while admin mode is locked.
    pub fn update_email(&mut self, email: &str) {
        let locked = self.check_lock().locked;
        self.selector.update_email(email, locked);
    }

    pub fn lockout(&self) -> LockoutGuard<'_, S, C> {
        LockoutGuard::new(&self.store, &self.clock)
    }

    pub fn devices(&self) -> DeviceTrustStore<'_, S, C> {
        DeviceTrustStore::new(&self.store, &self.clock)
    }

    #[must_use]
    pub fn check_lock(&self) -> LockStatus {
        self.lockout().check_lock()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.store.get(KEY_AUTH_TOKEN).is_some()
    }

    /// Forgets the persisted session token.
    ///
    /// # Errors
    /// Returns an error if the token cannot be removed.
    pub fn clear_token(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_AUTH_TOKEN)
    }

    /// Validates, sends and applies one login attempt.
    ///
    /// The role used is the one carried by `credentials`; the selector is moved to
    /// it first without persisting, so only explicit `set_role` calls are remembered.
    ///
    /// # Errors
    /// Returns [`GateError`] for every unsuccessful path. None of them leave the gate
    /// unusable; only an active lock keeps admin mode closed.
    #[instrument(skip_all, fields(role = %credentials.role()))]
    pub async fn submit(&mut self, credentials: &Credentials) -> Result<LoginOutcome, GateError> {
        let role = credentials.role();
        if role != self.selector.role() {
            self.selector.set_role(&self.store, role, false)?;
        }

        let result = self.try_submit(credentials).await;
        if let Err(err) = &result {
            self.selector.set_error(err.to_string());
        }
        result
    }

    async fn try_submit(&mut self, credentials: &Credentials) -> Result<LoginOutcome, GateError> {
        let role = credentials.role();

        if role == SessionRole::Privileged {
            let status = self.check_lock();
            if status.locked {
                warn!(
                    remaining_ms = status.remaining_ms(),
                    "admin login denied while locked"
                );
                self.selector
                    .set_role(&self.store, SessionRole::Standard, true)?;
                return Err(GateError::LockedOut {
                    remaining: status.remaining,
                });
            }
        }

        credentials.validate()?;

        let reply = match self.transport.login(role, &credentials.payload()).await {
            Ok(reply) => reply,
            Err(err) => {
                error!("login request failed: {err}");
                return Err(GateError::Transport(err.to_string()));
            }
        };

        match reply {
            LoginReply::Rejected { status, message } => {
                let message = message.unwrap_or_else(|| GENERIC_REJECTION.to_string());
                if role == SessionRole::Privileged {
                    let lock = self.lockout().record_failure()?;
                    warn!(status, locked = lock.locked, "admin login rejected");
                    self.selector
                        .set_role(&self.store, SessionRole::Standard, true)?;
                } else {
                    info!(status, "login rejected");
                }
                Err(GateError::Rejected { status, message })
            }
            LoginReply::Accepted { token } => {
                self.lockout().reset()?;

                let trusted_device = if credentials.trust_device() {
                    Some(self.devices().remember_device()?)
                } else {
                    None
                };

                let token_persisted = match token {
                    Some(token) => {
                        self.store.set(KEY_AUTH_TOKEN, token.expose_secret())?;
                        true
                    }
                    None => false,
                };

                info!(%role, token_persisted, "login succeeded");
                Ok(LoginOutcome {
                    role,
                    landing: role.landing_path(),
                    token_persisted,
                    trusted_device,
                })
            }
        }
    }
}
