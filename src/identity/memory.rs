// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process identity provider for local development and tests.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{AppError, Result};
use crate::identity::toolkit::friendly_message;
use crate::identity::{Identity, IdentityProvider};
use crate::models::new_id;

const TOKEN_PREFIX: &str = "memory-token:";

/// Email the provider would have sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentMail {
    Verification,
    PasswordReset,
}

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    email: String,
    password: String,
    email_verified: bool,
}

/// Memory-backed [`IdentityProvider`]. Cloning shares the same accounts.
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    /// Keyed by lowercased email
    accounts: Arc<DashMap<String, Account>>,
    outbox: Arc<DashMap<String, Vec<SentMail>>>,
    auto_verify: bool,
}

impl MemoryIdentity {
    /// `auto_verify` marks new accounts verified at sign-up, which suits local
    /// development where no mail is delivered.
    pub fn new(auto_verify: bool) -> Self {
        Self {
            auto_verify,
            ..Self::default()
        }
    }

    /// Mark an account's email verified, as clicking the emailed link would.
    pub fn verify_email(&self, email: &str) -> bool {
        match self.accounts.get_mut(&email.trim().to_lowercase()) {
            Some(mut account) => {
                account.email_verified = true;
                true
            }
            None => false,
        }
    }

    /// Mail sent to `email` so far, oldest first.
    pub fn sent_mail(&self, email: &str) -> Vec<SentMail> {
        self.outbox
            .get(&email.trim().to_lowercase())
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn has_identity(&self, user_id: &str) -> bool {
        self.accounts.iter().any(|a| a.user_id == user_id)
    }

    fn identity(account: &Account) -> Identity {
        Identity {
            user_id: account.user_id.clone(),
            email: account.email.clone(),
            email_verified: account.email_verified,
            id_token: format!("{}{}", TOKEN_PREFIX, account.user_id),
        }
    }

    fn user_for_token(&self, id_token: &str) -> Result<String> {
        id_token
            .strip_prefix(TOKEN_PREFIX)
            .filter(|uid| self.has_identity(uid))
            .map(str::to_string)
            .ok_or_else(|| AppError::Auth(friendly_message("INVALID_ID_TOKEN").to_string()))
    }

    fn send(&self, email: &str, mail: SentMail) {
        self.outbox
            .entry(email.trim().to_lowercase())
            .or_default()
            .push(mail);
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity> {
        let key = email.trim().to_lowercase();
        if !key.contains('@') {
            return Err(AppError::Auth(friendly_message("INVALID_EMAIL").to_string()));
        }
        if password.chars().count() < 6 {
            return Err(AppError::Auth(friendly_message("WEAK_PASSWORD").to_string()));
        }

        let account = match self.accounts.entry(key) {
            Entry::Occupied(_) => {
                return Err(AppError::Auth(friendly_message("EMAIL_EXISTS").to_string()));
            }
            Entry::Vacant(slot) => slot
                .insert(Account {
                    user_id: new_id(),
                    email: email.trim().to_string(),
                    password: password.to_string(),
                    email_verified: self.auto_verify,
                })
                .clone(),
        };

        tracing::info!(user_id = %account.user_id, "Identity created (memory)");
        Ok(Self::identity(&account))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        match self.accounts.get(&email.trim().to_lowercase()) {
            Some(account) if account.password == password => Ok(Self::identity(&account)),
            _ => Err(AppError::Auth(
                friendly_message("INVALID_LOGIN_CREDENTIALS").to_string(),
            )),
        }
    }

    async fn send_email_verification(&self, id_token: &str) -> Result<()> {
        let user_id = self.user_for_token(id_token)?;
        let email = self
            .accounts
            .iter()
            .find(|a| a.user_id == user_id)
            .map(|a| a.email.clone());
        if let Some(email) = email {
            self.send(&email, SentMail::Verification);
        }
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        if !self.accounts.contains_key(&email.trim().to_lowercase()) {
            return Err(AppError::Auth(friendly_message("EMAIL_NOT_FOUND").to_string()));
        }
        self.send(email, SentMail::PasswordReset);
        Ok(())
    }

    async fn delete_identity(&self, id_token: &str) -> Result<()> {
        let user_id = self.user_for_token(id_token)?;
        self.accounts.retain(|_, a| a.user_id != user_id);
        tracing::info!(user_id = %user_id, "Identity deleted (memory)");
        Ok(())
    }
}
