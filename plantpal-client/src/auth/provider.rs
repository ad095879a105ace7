//! Identity provider
//!
//! [`IdentityToolkitProvider`] talks to the Identity Toolkit REST API
//! (`accounts:signInWithPassword`, `accounts:signUp`, `accounts:update`).
//! Provider error reasons are mapped onto the `auth/...` codes the web SDK
//! uses, so callers can match on e.g. [`USER_NOT_FOUND`].

use std::time::Duration;

use async_trait::async_trait;
use plantpal_common::error_chain;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

pub const USER_NOT_FOUND: &str = "auth/user-not-found";
const INTERNAL_ERROR: &str = "auth/internal-error";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejected by the provider (bad credentials, duplicate account, ...)
    #[error("{message}")]
    Provider { code: String, message: String },

    #[error("Identity provider unreachable: {0}")]
    Transport(String),

    #[error("Invalid identity provider response: {0}")]
    InvalidResponse(String),

    /// Rejected locally; the provider was not called
    #[error("{0}")]
    InvalidInput(String),
}

impl AuthError {
    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::Provider { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_user_not_found(&self) -> bool {
        self.code() == Some(USER_NOT_FOUND)
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Signed-in account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub id_token: String,
}

/// Account operations offered by an identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<User>;

    /// Create the account, then set its display name
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> AuthResult<User>;

    async fn sign_out(&self) -> AuthResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Identity Toolkit REST client
#[derive(Debug, Clone)]
pub struct IdentityToolkitProvider {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl IdentityToolkitProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AuthResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Transport(error_chain(&e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> AuthResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/accounts:{}", self.endpoint, method);
        debug!(method, "Calling identity provider");

        // without_url: the request URL carries the API key
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(error_chain(&e.without_url())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(error_chain(&e.without_url())))?;

        if !status.is_success() {
            return Err(provider_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<User> {
        let account: AccountResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        into_user(account)
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> AuthResult<User> {
        let account: AccountResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let mut user = into_user(account)?;

        if !name.is_empty() {
            let updated: AccountResponse = self
                .call(
                    "update",
                    &UpdateProfileRequest {
                        id_token: &user.id_token,
                        display_name: name,
                        return_secure_token: false,
                    },
                )
                .await?;
            user.display_name = non_empty(updated.display_name).or_else(|| Some(name.to_string()));
        }

        Ok(user)
    }

    /// Tokens are held client-side only; nothing to revoke remotely
    async fn sign_out(&self) -> AuthResult<()> {
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn into_user(account: AccountResponse) -> AuthResult<User> {
    let id_token = account
        .id_token
        .ok_or_else(|| AuthError::InvalidResponse("missing idToken".to_string()))?;

    Ok(User {
        uid: account.local_id,
        email: account.email,
        display_name: non_empty(account.display_name),
        id_token,
    })
}

/// Map an error reply (`{"error":{"message":"EMAIL_NOT_FOUND"}}`) to an error code
fn provider_error(status: u16, body: &str) -> AuthError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return AuthError::Provider {
            code: INTERNAL_ERROR.to_string(),
            message: format!("Identity provider returned status {}", status),
        };
    };

    // Reasons may carry detail: "WEAK_PASSWORD : Password should be at least 6 characters"
    let (reason, detail) = match envelope.error.message.split_once(" : ") {
        Some((reason, detail)) => (reason.trim(), Some(detail.trim())),
        None => (envelope.error.message.trim(), None),
    };

    let (code, message) = match reason {
        "EMAIL_NOT_FOUND" => (
            USER_NOT_FOUND,
            "There is no user record corresponding to this identifier.",
        ),
        "INVALID_PASSWORD" => ("auth/wrong-password", "The password is invalid."),
        "INVALID_LOGIN_CREDENTIALS" => (
            "auth/invalid-credential",
            "The email or password is incorrect.",
        ),
        "EMAIL_EXISTS" => (
            "auth/email-already-in-use",
            "The email address is already in use by another account.",
        ),
        "INVALID_EMAIL" => ("auth/invalid-email", "The email address is badly formatted."),
        "MISSING_PASSWORD" => ("auth/missing-password", "A password is required."),
        "WEAK_PASSWORD" => (
            "auth/weak-password",
            detail.unwrap_or("Password should be at least 6 characters."),
        ),
        "USER_DISABLED" => (
            "auth/user-disabled",
            "The user account has been disabled by an administrator.",
        ),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => (
            "auth/too-many-requests",
            "Too many unsuccessful attempts. Try again later.",
        ),
        other => {
            return AuthError::Provider {
                code: INTERNAL_ERROR.to_string(),
                message: if other.is_empty() {
                    format!("Identity provider returned status {}", status)
                } else {
                    other.to_string()
                },
            }
        }
    };

    AuthError::Provider {
        code: code.to_string(),
        message: message.to_string(),
    }
}
