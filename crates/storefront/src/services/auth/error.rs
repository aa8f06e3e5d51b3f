//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Wrong password, or no account for the email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for the email.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// No identity provider is configured.
    #[error("sign-in is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request for another reason.
    #[error("identity provider error: {0}")]
    Provider(String),
}

impl From<ekocart_core::EmailError> for AuthError {
    fn from(err: ekocart_core::EmailError) -> Self {
        Self::InvalidEmail(err.to_string())
    }
}

impl AuthError {
    /// Map an Identity Toolkit error code (`error.message`) to an `AuthError`.
    ///
    /// Codes may carry a detail after a colon, e.g.
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    #[must_use]
    pub fn from_provider_code(message: &str) -> Self {
        let (code, detail) = message
            .split_once(':')
            .map_or((message.trim(), ""), |(c, d)| (c.trim(), d.trim()));

        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "USER_DISABLED" => Self::InvalidCredentials,
            "EMAIL_EXISTS" => Self::UserAlreadyExists,
            "WEAK_PASSWORD" => Self::WeakPassword(if detail.is_empty() {
                "Password is too weak".to_string()
            } else {
                detail.to_string()
            }),
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail(code.to_string()),
            _ => Self::Provider(message.to_string()),
        }
    }
}
