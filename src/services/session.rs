// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, sign-in and password reset against the identity provider.
//!
//! Only verified emails get a session. Session tokens themselves are minted
//! by the HTTP layer (see `middleware::auth::create_jwt`).

use std::sync::Arc;

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::identity::IdentityProvider;
use crate::models::{Session, User};
use crate::time_utils::now_rfc3339;

/// Registration form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password should be at least 6 characters."))]
    pub password: String,
    pub password_confirmation: String,
    pub accepted_terms: bool,
}

/// Email and password, for sign-in and re-sending the verification email.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    fn check(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Please enter email and password.".to_string(),
            ));
        }
        Ok(())
    }
}

/// A successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub session: Session,
    pub user: User,
}

/// First validation message, taking fields in name order so the result is stable.
fn first_violation(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let message = fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input.".to_string());
    AppError::Validation(message)
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl SessionService {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Create the identity, send the verification email and write the user
    /// document. No session is issued until the email is verified.
    pub async fn register(&self, mut request: RegisterRequest) -> Result<User> {
        if !request.accepted_terms {
            return Err(AppError::Validation(
                "You must agree to the terms of service.".to_string(),
            ));
        }
        if request.password != request.password_confirmation {
            return Err(AppError::Validation("Passwords do not match.".to_string()));
        }
        request.email = request.email.trim().to_string();
        request.validate().map_err(first_violation)?;

        let identity = self
            .identity
            .sign_up(&request.email, &request.password)
            .await?;
        self.identity
            .send_email_verification(&identity.id_token)
            .await?;

        let now = now_rfc3339();
        let user = User {
            user_id: identity.user_id,
            email: identity.email,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            created_at: now.clone(),
            last_active: now,
        };
        self.store.upsert_user(&user).await?;

        tracing::info!(user_id = %user.user_id, "User registered, verification email sent");
        Ok(user)
    }

    /// Sign in a verified user and record the activity on their user document.
    pub async fn login(&self, credentials: &Credentials) -> Result<SignedIn> {
        credentials.check()?;

        let identity = self
            .identity
            .sign_in(credentials.email.trim(), &credentials.password)
            .await?;
        if !identity.email_verified {
            tracing::info!(user_id = %identity.user_id, "Sign-in blocked, email not verified");
            return Err(AppError::EmailNotVerified);
        }

        let now = now_rfc3339();
        let user = match self.store.get_user(&identity.user_id).await? {
            Some(mut user) => {
                user.user_id = identity.user_id.clone();
                if user.email.is_empty() {
                    user.email = identity.email.clone();
                }
                if user.created_at.is_empty() {
                    user.created_at = now.clone();
                }
                user.last_active = now;
                user
            }
            None => User {
                user_id: identity.user_id.clone(),
                email: identity.email.clone(),
                first_name: String::new(),
                last_name: String::new(),
                created_at: now.clone(),
                last_active: now,
            },
        };
        self.store.upsert_user(&user).await?;

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(SignedIn {
            session: Session {
                user_id: identity.user_id,
                email: identity.email,
            },
            user,
        })
    }

    /// Send the verification email again. Already-verified accounts get nothing.
    pub async fn resend_verification(&self, credentials: &Credentials) -> Result<()> {
        credentials.check()?;

        let identity = self
            .identity
            .sign_in(credentials.email.trim(), &credentials.password)
            .await?;
        if identity.email_verified {
            return Ok(());
        }
        self.identity
            .send_email_verification(&identity.id_token)
            .await?;
        tracing::info!(user_id = %identity.user_id, "Verification email re-sent");
        Ok(())
    }

    /// Ask the provider to email a reset link.
    ///
    /// Provider failures are logged, not returned, so the response does not
    /// reveal whether an account exists.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::Validation("Please enter your email.".to_string()));
        }
        if let Err(e) = self.identity.send_password_reset(email).await {
            tracing::warn!(error = %e, "Password reset email not sent");
        }
        Ok(())
    }

    /// The signed-in user's profile document.
    pub async fn profile(&self, session: &Session) -> Result<User> {
        self.store
            .get_user(&session.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }
}
