//! Role-specific credentials and the request bodies built from them. Passwords
//! and security answers stay wrapped in `SecretString` until serialization and
//! must never be logged.

use super::role::SessionRole;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

#[derive(Debug)]
pub enum Credentials {
    Standard {
        email: String,
        password: SecretString,
        remember_me: bool,
    },
    Privileged {
        email: String,
        password: SecretString,
        two_factor_code: String,
        security_question: String,
        security_answer: SecretString,
        trust_device: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your email and password.")]
    MissingCredentials,
    #[error("Admin login requires your email and password.")]
    MissingAdminCredentials,
    #[error("Enter the 6-digit code from your authenticator app.")]
    InvalidTwoFactorCode,
    #[error("Choose a security question and provide its answer.")]
    MissingSecurityAnswer,
}

/// JSON body posted to the login endpoint.
#[derive(Serialize)]
#[serde(tag = "role")]
pub enum LoginPayload<'a> {
    #[serde(rename = "user", rename_all = "camelCase")]
    Standard {
        email: &'a str,
        password: &'a str,
        remember_me: bool,
    },
    #[serde(rename = "admin", rename_all = "camelCase")]
    Privileged {
        email: &'a str,
        password: &'a str,
        two_factor_code: &'a str,
        security_question: &'a str,
        security_answer: &'a str,
        trust_device: bool,
    },
}

#[must_use]
pub fn is_valid_two_factor_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

impl Credentials {
    #[must_use]
    pub const fn role(&self) -> SessionRole {
        match self {
            Self::Standard { .. } => SessionRole::Standard,
            Self::Privileged { .. } => SessionRole::Privileged,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Standard { email, .. } | Self::Privileged { email, .. } => email.trim(),
        }
    }

    #[must_use]
    pub const fn trust_device(&self) -> bool {
        matches!(
            self,
            Self::Privileged {
                trust_device: true,
                ..
            }
        )
    }

    /// Local checks run before anything leaves the client.
    ///
    /// # Errors
    /// Returns the first missing or malformed field for the credential's role.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Standard { password, .. } => {
                if self.email().is_empty() || password.expose_secret().is_empty() {
                    return Err(ValidationError::MissingCredentials);
                }
            }
            Self::Privileged {
                password,
                two_factor_code,
                security_question,
                security_answer,
                ..
            } => {
                if self.email().is_empty() || password.expose_secret().is_empty() {
                    return Err(ValidationError::MissingAdminCredentials);
                }
                if !is_valid_two_factor_code(two_factor_code) {
                    return Err(ValidationError::InvalidTwoFactorCode);
                }
                if security_question.trim().is_empty()
                    || security_answer.expose_secret().trim().is_empty()
                {
                    return Err(ValidationError::MissingSecurityAnswer);
                }
            }
        }
        Ok(())
    }

    /// Borrows the credentials as the role-shaped request body.
    #[must_use]
    pub fn payload(&self) -> LoginPayload<'_> {
        match self {
            Self::Standard {
                password,
                remember_me,
                ..
            } => LoginPayload::Standard {
                email: self.email(),
                password: password.expose_secret(),
                remember_me: *remember_me,
            },
            Self::Privileged {
                password,
                two_factor_code,
                security_question,
                security_answer,
                trust_device,
                ..
            } => LoginPayload::Privileged {
                email: self.email(),
                password: password.expose_secret(),
                two_factor_code: two_factor_code.as_str(),
                security_question: security_question.trim(),
                security_answer: security_answer.expose_secret(),
                trust_device: *trust_device,
            },
        }
    }
}
