// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication client over the Identity Toolkit v1 REST API.
//!
//! Handles:
//! - Email/password sign-up and sign-in
//! - Email verification status lookup
//! - Verification and password reset emails
//! - Identity deletion
//!
//! Set FIREBASE_AUTH_EMULATOR_HOST to talk to the Auth emulator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::identity::{Identity, IdentityProvider};

const PRODUCTION_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Identity Toolkit REST client.
#[derive(Clone)]
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
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
struct OobCodeRequest<'a> {
    request_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdTokenRequest<'a> {
    id_token: &'a str,
}

/// Response to signUp / signInWithPassword.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl IdentityToolkitClient {
    /// Create a client for the production API, or the emulator if
    /// FIREBASE_AUTH_EMULATOR_HOST is set.
    pub fn new(api_key: String) -> Self {
        let base_url = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Firebase Auth emulator");
                format!("http://{}/identitytoolkit.googleapis.com/v1", host)
            }
            Err(_) => PRODUCTION_BASE_URL.to_string(),
        };
        Self::with_base_url(api_key, base_url)
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// POST `body` to `accounts:{method}` and parse the JSON response.
    async fn call<B: Serialize + ?Sized, T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = format!("{}/accounts:{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_response(method, status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Identity(format!("Failed to parse {} response: {}", method, e)))
    }

    async fn email_verified(&self, id_token: &str, user_id: &str) -> Result<bool, AppError> {
        let lookup: LookupResponse = self.call("lookup", &IdTokenRequest { id_token }).await?;
        Ok(lookup
            .users
            .iter()
            .any(|u| u.local_id == user_id && u.email_verified))
    }
}

/// Turn an Identity Toolkit error response into an `AppError`.
///
/// Error bodies look like `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`;
/// some messages carry a detail after " : ".
fn map_error_response(method: &str, status: reqwest::StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_default();
    let code = message.split(" : ").next().unwrap_or_default().trim();

    tracing::warn!(method, status = status.as_u16(), code, "Identity Toolkit error");

    if status.is_server_error() || code.is_empty() {
        return AppError::Identity(format!("HTTP {}: {}", status, body));
    }
    AppError::Auth(friendly_message(code).to_string())
}

/// User-facing text for an Identity Toolkit error code.
pub(super) fn friendly_message(code: &str) -> &'static str {
    match code {
        "EMAIL_EXISTS" => "This email is already in use. Please use another email or log in.",
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "Incorrect email or password.",
        "EMAIL_NOT_FOUND" => "No account found with this email.",
        "INVALID_EMAIL" => "The email address is badly formatted.",
        "WEAK_PASSWORD" => "Password should be at least 6 characters.",
        "USER_DISABLED" => "This account has been disabled.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please try again later.",
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
            "Please sign in again."
        }
        _ => "Authentication failed.",
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let resp: PasswordResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        tracing::info!(user_id = %resp.local_id, "Identity created");

        Ok(Identity {
            user_id: resp.local_id,
            email: if resp.email.is_empty() {
                email.to_string()
            } else {
                resp.email
            },
            email_verified: false,
            id_token: resp.id_token,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let resp: PasswordResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        // signInWithPassword does not report verification status.
        let email_verified = self.email_verified(&resp.id_token, &resp.local_id).await?;

        Ok(Identity {
            user_id: resp.local_id,
            email: if resp.email.is_empty() {
                email.to_string()
            } else {
                resp.email
            },
            email_verified,
            id_token: resp.id_token,
        })
    }

    async fn send_email_verification(&self, id_token: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "VERIFY_EMAIL",
                    id_token: Some(id_token),
                    email: None,
                },
            )
            .await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "PASSWORD_RESET",
                    id_token: None,
                    email: Some(email),
                },
            )
            .await?;
        Ok(())
    }

    async fn delete_identity(&self, id_token: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self.call("delete", &IdTokenRequest { id_token }).await?;
        tracing::info!("Identity deleted");
        Ok(())
    }
}
