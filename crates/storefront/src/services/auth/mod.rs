//! Authentication service.
//!
//! Email and password accounts live with a third-party identity provider
//! (Firebase Identity Toolkit REST API). The storefront only keeps the
//! resulting [`CurrentUser`] in the session.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use ekocart_core::Email;

use crate::config::FirebaseConfig;
use crate::models::CurrentUser;

/// Minimum password length accepted by the provider.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Client for the identity provider.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

impl AuthClient {
    /// Create a new identity provider client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(AuthClientInner {
                client,
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .call("accounts:signInWithPassword", &email, password)
            .await?;
        info!(uid = %user.uid, "User signed in");
        Ok(user)
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let user = self.call("accounts:signUp", &email, password).await?;
        info!(uid = %user.uid, "User signed up");
        Ok(user)
    }

    async fn call(
        &self,
        method: &str,
        email: &Email,
        password: &str,
    ) -> Result<CurrentUser, AuthError> {
        let url = url::Url::parse_with_params(
            &format!("{}/{method}", self.inner.endpoint),
            &[("key", self.inner.api_key.expose_secret())],
        )
        .map_err(|e| AuthError::Provider(format!("invalid endpoint: {e}")))?;
        let body = PasswordRequest {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };

        let response = self
            .inner
            .client
            .post(url)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<ProviderErrorBody>(&text).map_or_else(
                |_| AuthError::Provider(format!("HTTP {status}")),
                |body| AuthError::from_provider_code(&body.error.message),
            );
            warn!(status = %status, error = %error, "Identity provider rejected request");
            return Err(error);
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let email = match account.email.as_deref() {
            Some(returned) => Email::parse(returned).unwrap_or_else(|_| email.clone()),
            None => email.clone(),
        };

        Ok(CurrentUser {
            uid: account.local_id,
            email,
        })
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.trim().is_empty() {
        return Err(AuthError::WeakPassword(
            "Password cannot be blank".to_string(),
        ));
    }
    Ok(())
}
