// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication provider seam (Firebase Authentication, or in-process memory).

pub mod memory;
pub mod toolkit;

pub use memory::{MemoryIdentity, SentMail};
pub use toolkit::IdentityToolkitClient;

use crate::error::Result;
use async_trait::async_trait;

/// A signed-in identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider user id; also the root user document id
    pub user_id: String,
    pub email: String,
    pub email_verified: bool,
    /// Short-lived provider credential used for follow-up calls on this identity
    pub id_token: String,
}

/// Email/password identity operations.
///
/// Provider rejections (wrong password, email in use, ...) come back as
/// `AppError::Auth` with a message fit for the user; transport failures as
/// `AppError::Identity`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    async fn send_email_verification(&self, id_token: &str) -> Result<()>;

    async fn send_password_reset(&self, email: &str) -> Result<()>;

    /// Delete the identity the token belongs to.
    async fn delete_identity(&self, id_token: &str) -> Result<()>;
}
