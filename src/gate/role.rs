//! Role selection for the shared login form.

use super::store::{ClientStore, StoreError, KEY_ROLE};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::OnceLock};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionRole {
    #[default]
    #[serde(rename = "user")]
    Standard,
    #[serde(rename = "admin")]
    Privileged,
}

impl SessionRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "user",
            Self::Privileged => "admin",
        }
    }

    /// Endpoint path credentials for this role are posted to.
    #[must_use]
    pub const fn login_path(self) -> &'static str {
        match self {
            Self::Standard => "/api/auth/login",
            Self::Privileged => "/api/admin/login",
        }
    }

    /// Where a successful login for this role lands.
    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        match self {
            Self::Standard => "/dashboard",
            Self::Privileged => "/admin/dashboard",
        }
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for SessionRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::Standard),
            "admin" => Ok(Self::Privileged),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// True when the local part of `email` carries an `admin` marker.
#[must_use]
pub fn looks_like_admin_email(email: &str) -> bool {
    static ADMIN_MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = ADMIN_MARKER.get_or_init(|| Regex::new(r"(?i)^[^@\s]*admin[^@\s]*@").ok())
    else {
        return false;
    };
    re.is_match(email.trim())
}

/// Current role plus the UI flags derived from it.
#[derive(Debug, Default)]
pub struct RoleSelector {
    role: SessionRole,
    admin_hint: bool,
    error: Option<String>,
}

impl RoleSelector {
    /// Restores the last persisted role, defaulting to standard for anything unrecognized.
    pub fn load_persisted<S: ClientStore>(store: &S) -> Self {
        let role = match store.get(KEY_ROLE) {
            Some(raw) => raw.parse::<SessionRole>().unwrap_or_else(|err| {
                warn!("{err}, using default role");
                SessionRole::default()
            }),
            None => SessionRole::default(),
        };
        debug!(%role, "loaded role");

        Self {
            role,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn role(&self) -> SessionRole {
        self.role
    }

    #[must_use]
    pub const fn admin_hint(&self) -> bool {
        self.admin_hint
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Switches role and clears the error. Only explicit choices should pass `persist`.
    ///
    /// # Errors
    /// Returns an error if the role cannot be persisted.
    pub fn set_role<S: ClientStore>(
        &mut self,
        store: &S,
        role: SessionRole,
        persist: bool,
    ) -> Result<(), StoreError> {
        self.role = role;
        self.error = None;
        if role == SessionRole::Privileged {
            self.admin_hint = false;
        }
        if persist {
            store.set(KEY_ROLE, role.as_str())?;
        }
        Ok(())
    }

    /// Re-evaluates the admin hint for a newly typed email. Never changes the role.
    ///
    /// No hint is raised while admin mode is locked, since it would point at a
    /// role that cannot be used yet.
    pub fn update_email(&mut self, email: &str, admin_locked: bool) {
        self.admin_hint = !admin_locked
            && self.role == SessionRole::Standard
            && looks_like_admin_email(email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::store::MemoryStore;

    #[test]
    fn role_wire_names() {
        assert_eq!(SessionRole::Standard.as_str(), "user");
        assert_eq!(SessionRole::Privileged.as_str(), "admin");
        assert_eq!("admin".parse::<SessionRole>(), Ok(SessionRole::Privileged));
        assert!("root".parse::<SessionRole>().is_err());
        assert_eq!(
            serde_json::to_string(&SessionRole::Standard).ok().as_deref(),
            Some("\"user\"")
        );
    }

    #[test]
    fn load_persisted_defaults_to_standard() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        assert_eq!(
            RoleSelector::load_persisted(&store).role(),
            SessionRole::Standard
        );

        store.set(KEY_ROLE, "superuser")?;
        assert_eq!(
            RoleSelector::load_persisted(&store).role(),
            SessionRole::Standard
        );

        store.set(KEY_ROLE, "admin")?;
        assert_eq!(
            RoleSelector::load_persisted(&store).role(),
            SessionRole::Privileged
        );
        Ok(())
    }

    #[test]
    fn set_role_persists_and_clears_error() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        let mut selector = RoleSelector::load_persisted(&store);
        selector.set_error("Invalid credentials");

        selector.set_role(&store, SessionRole::Privileged, true)?;
        assert_eq!(selector.role(), SessionRole::Privileged);
        assert!(selector.error().is_none());
        assert_eq!(store.get(KEY_ROLE).as_deref(), Some("admin"));
        Ok(())
    }

    #[test]
    fn set_role_without_persist_leaves_store() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        let mut selector = RoleSelector::default();
        selector.set_role(&store, SessionRole::Privileged, false)?;
        assert_eq!(selector.role(), SessionRole::Privileged);
        assert!(store.get(KEY_ROLE).is_none());
        Ok(())
    }

    #[test]
    fn admin_email_sets_hint_without_switching() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        let mut selector = RoleSelector::load_persisted(&store);

        selector.update_email("jane-admin@example.com", false);
        assert!(selector.admin_hint());
        assert_eq!(selector.role(), SessionRole::Standard);
        assert_eq!(selector.role().as_str(), "user");

        selector.set_role(&store, SessionRole::Privileged, true)?;
        assert!(!selector.admin_hint());
        assert_eq!(selector.role().as_str(), "admin");
        Ok(())
    }

    #[test]
    fn admin_marker_detection() {
        assert!(looks_like_admin_email("ADMIN@corp.io"));
        assert!(looks_like_admin_email("  sysadmin@corp.io "));
        assert!(!looks_like_admin_email("jane@admin.example.com"));
        assert!(!looks_like_admin_email("jane@example.com"));
        assert!(!looks_like_admin_email("admin"));
    }

    #[test]
    fn hint_clears_for_regular_email() {
        let mut selector = RoleSelector::default();
        selector.update_email("admin@example.com", false);
        assert!(selector.admin_hint());
        selector.update_email("jane@example.com", false);
        assert!(!selector.admin_hint());
    }

    #[test]
    fn no_hint_while_admin_locked() {
        let mut selector = RoleSelector::default();
        selector.update_email("admin@example.com", true);
        assert!(!selector.admin_hint());
        assert_eq!(selector.role(), SessionRole::Standard);

        selector.update_email("admin@example.com", false);
        assert!(selector.admin_hint());
    }
}
