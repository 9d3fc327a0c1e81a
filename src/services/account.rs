// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account purge: delete everything a user owns, then the identity itself.
//!
//! Order:
//! 1. Re-authenticate with the user's password
//! 2. Sweep `runFolders`, `liftFolders`, `weightFolder`
//! 3. Delete the root user document
//! 4. Delete the authentication identity
//!
//! Each step finishes before the next starts. The first failure stops the
//! purge; steps already done stay done.

use std::sync::Arc;

use serde::Serialize;

use crate::db::{DocumentStore, UserCollection};
use crate::error::{AppError, Result};
use crate::identity::IdentityProvider;
use crate::models::Session;

/// What a completed purge removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeReport {
    pub run_folders: usize,
    pub lift_folders: usize,
    pub weight_records: usize,
}

impl PurgeReport {
    fn record(&mut self, collection: UserCollection, count: usize) {
        match collection {
            UserCollection::RunFolders => self.run_folders = count,
            UserCollection::LiftFolders => self.lift_folders = count,
            UserCollection::WeightRecords => self.weight_records = count,
        }
    }
}

#[derive(Clone)]
pub struct AccountPurge {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AccountPurge {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    pub async fn delete_account(
        &self,
        session: Option<&Session>,
        password: &str,
    ) -> Result<PurgeReport> {
        let session = session.ok_or(AppError::NoSession)?;
        if password.is_empty() {
            return Err(AppError::Validation(
                "Please enter your password.".to_string(),
            ));
        }

        let credential = self.identity.sign_in(&session.email, password).await?;
        if credential.user_id != session.user_id {
            tracing::warn!(
                user_id = %session.user_id,
                "Re-authentication resolved to a different user"
            );
            return Err(AppError::Auth(
                "These credentials do not belong to the signed-in user.".to_string(),
            ));
        }

        tracing::info!(user_id = %session.user_id, "Starting account purge");

        let mut report = PurgeReport::default();
        for collection in UserCollection::PURGE_ORDER {
            let count = self
                .store
                .delete_collection(&session.user_id, collection)
                .await
                .inspect_err(|e| {
                    tracing::error!(
                        user_id = %session.user_id,
                        collection = collection.name(),
                        error = %e,
                        "Account purge stopped"
                    )
                })?;
            report.record(collection, count);
            tracing::info!(
                user_id = %session.user_id,
                collection = collection.name(),
                count,
                "Purged collection"
            );
        }

        self.store
            .delete_user(&session.user_id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    user_id = %session.user_id,
                    error = %e,
                    "Failed to delete user document"
                )
            })?;
        tracing::info!(user_id = %session.user_id, "Deleted user document");

        self.identity
            .delete_identity(&credential.id_token)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    user_id = %session.user_id,
                    error = %e,
                    "Failed to delete identity"
                )
            })?;

        tracing::info!(
            user_id = %session.user_id,
            run_folders = report.run_folders,
            lift_folders = report.lift_folders,
            weight_records = report.weight_records,
            "Account purge complete"
        );

        Ok(report)
    }
}
