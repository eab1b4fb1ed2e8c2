//! Transport for login requests. The gate talks to an [`AuthTransport`] so the
//! submit flow can be exercised without a server; [`client::HttpTransport`] is the
//! real implementation.

pub mod client;
pub mod errors;

pub use self::client::HttpTransport;
pub use self::errors::ApiError;

use crate::gate::{credentials::LoginPayload, role::SessionRole};
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;

/// Header mirroring the body's `role` field.
pub const ROLE_HEADER: &str = "X-Auth-Role";

/// Server answer to a login request that made it to the server and back.
#[derive(Debug)]
pub enum LoginReply {
    Accepted { token: Option<SecretString> },
    Rejected { status: u16, message: Option<String> },
}

#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Sends one login request for `role`.
    ///
    /// # Errors
    /// Returns an error only when no usable HTTP response was received.
    async fn login(
        &self,
        role: SessionRole,
        payload: &LoginPayload<'_>,
    ) -> Result<LoginReply, ApiError>;
}

#[async_trait]
impl<T: AuthTransport + ?Sized> AuthTransport for Arc<T> {
    async fn login(
        &self,
        role: SessionRole,
        payload: &LoginPayload<'_>,
    ) -> Result<LoginReply, ApiError> {
        (**self).login(role, payload).await
    }
}
