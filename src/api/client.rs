//! HTTP transport for the login endpoints with a fixed request timeout. Request
//! bodies carry passwords and security answers, so nothing here logs them; only
//! the role, URL and status are traced.

use super::{ApiError, AuthTransport, LoginReply, ROLE_HEADER};
use crate::{
    gate::{credentials::LoginPayload, role::SessionRole},
    APP_USER_AGENT,
};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default request timeout applied to login calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Deserialize, Default)]
struct ReplyBody {
    token: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a transport against `base_url` (scheme and host, optional path prefix).
    ///
    /// # Errors
    /// Returns an error if the base URL is not an absolute http(s) URL or the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| ApiError::Config(format!("Invalid API base URL {base_url}: {err}")))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ApiError::Config(format!(
                    "Unsupported API URL scheme: {scheme}"
                )))
            }
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim().to_string(),
        })
    }

    #[must_use]
    pub fn url_for(&self, role: SessionRole) -> String {
        build_url_with_base(&self.base_url, role.login_path())
    }
}

#[async_trait]
impl AuthTransport for HttpTransport {
    #[instrument(skip(self, payload))]
    async fn login(
        &self,
        role: SessionRole,
        payload: &LoginPayload<'_>,
    ) -> Result<LoginReply, ApiError> {
        let url = self.url_for(role);
        let body = serde_json::to_vec(payload)
            .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))?;

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ROLE_HEADER, role.as_str())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%url, status = status.as_u16(), "login response");

        let reply = if text.trim().is_empty() {
            ReplyBody::default()
        } else {
            serde_json::from_str::<ReplyBody>(&text).unwrap_or_else(|err| {
                warn!("login response is not JSON: {err}");
                ReplyBody {
                    token: None,
                    message: (!status.is_success()).then(|| sanitize_body(&text)),
                }
            })
        };

        if status.is_success() {
            Ok(LoginReply::Accepted {
                token: reply
                    .token
                    .filter(|token| !token.is_empty())
                    .map(SecretString::from),
            })
        } else {
            Ok(LoginReply::Rejected {
                status: status.as_u16(),
                message: reply
                    .message
                    .map(|message| sanitize_body(&message))
                    .filter(|message| !message.is_empty()),
            })
        }
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Trims and truncates server text before it reaches the user.
fn sanitize_body(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_slashes() {
        assert_eq!(
            build_url_with_base("http://localhost:8080/", "/api/auth/login"),
            "http://localhost:8080/api/auth/login"
        );
        assert_eq!(
            build_url_with_base("https://portal.example.com/v2", "api/admin/login"),
            "https://portal.example.com/v2/api/admin/login"
        );
        assert_eq!(build_url_with_base("", "/api/auth/login"), "/api/auth/login");
    }

    #[test]
    fn url_for_role() -> Result<(), ApiError> {
        let transport = HttpTransport::new("http://127.0.0.1:9000", DEFAULT_TIMEOUT)?;
        assert_eq!(
            transport.url_for(SessionRole::Standard),
            "http://127.0.0.1:9000/api/auth/login"
        );
        assert_eq!(
            transport.url_for(SessionRole::Privileged),
            "http://127.0.0.1:9000/api/admin/login"
        );
        Ok(())
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            HttpTransport::new("localhost:8080", DEFAULT_TIMEOUT),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            HttpTransport::new("ftp://example.com", DEFAULT_TIMEOUT),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn sanitize_truncates() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_body(&long).len(), MAX_ERROR_CHARS);
        assert_eq!(sanitize_body("  nope \n"), "nope");
    }
}
