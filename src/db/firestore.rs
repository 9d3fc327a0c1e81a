// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Layout:
//! - `users/{userId}` (root user document)
//! - `users/{userId}/runFolders/{folderId}`
//! - `users/{userId}/liftFolders/{folderId}`
//! - `users/{userId}/weightFolder/{recordId}`

use crate::db::{collections, DocumentStore, UserCollection};
use crate::error::AppError;
use crate::models::{
    FolderDocument, FolderKind, FolderSummary, LiftDay, LiftFolder, RunEntry, RunFolder, User,
    WeightRecord,
};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{paths, FirestoreConsistencySelector, FirestoreQueryDirection};
use futures_util::{stream, StreamExt};
use serde::Deserialize;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Delete batches committed at once during a sweep.
const MAX_CONCURRENT_BATCHES: usize = 8;

/// Only the document id, for sweeping collections of any shape.
#[derive(Deserialize)]
struct DocId {
    #[serde(alias = "_firestore_id")]
    id: String,
}

fn db_error(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

/// Map a failed transactional read or commit.
///
/// Firestore aborts a transaction when another writer touched the same
/// document first; callers see that as a stale revision, like a failed
/// revision check.
fn transaction_error(context: &str, e: FirestoreError) -> AppError {
    let contended = match &e {
        FirestoreError::DatabaseError(err) => err.public.code == "Aborted",
        FirestoreError::DataConflictError(_) => true,
        _ => false,
    };
    if contended {
        tracing::warn!(error = %e, "{}: transaction aborted by a concurrent writer", context);
        AppError::Conflict(AppError::STALE_REVISION.to_string())
    } else {
        AppError::Database(format!("{}: {}", context, e))
    }
}

fn folder_not_found() -> AppError {
    AppError::NotFound("Folder not found.".to_string())
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline Firestore client.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Ids of every document in one of the user's sub-collections.
    async fn list_document_ids(
        &self,
        user_id: &str,
        collection: &str,
    ) -> Result<Vec<String>, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        let docs: Vec<DocId> = client
            .fluent()
            .select()
            .from(collection)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(db_error)?;

        Ok(docs.into_iter().map(|d| d.id).collect())
    }

    /// Helper to batch delete documents under a user using transactions.
    async fn batch_delete(
        &self,
        user_id: &str,
        collection: &str,
        doc_ids: &[String],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        let parent = &parent;

        stream::iter(doc_ids.chunks(BATCH_SIZE).map(<[String]>::to_vec))
            .map(|chunk| async move {
                let mut transaction = client.begin_transaction().await.map_err(|e| {
                    AppError::Database(format!("Failed to begin transaction: {}", e))
                })?;

                for doc_id in &chunk {
                    client
                        .fluent()
                        .delete()
                        .from(collection)
                        .document_id(doc_id)
                        .parent(parent)
                        .add_to_transaction(&mut transaction)
                        .map_err(|e| {
                            AppError::Database(format!(
                                "Failed to add deletion to transaction for {}: {}",
                                collection, e
                            ))
                        })?;
                }

                transaction.commit().await.map_err(|e| {
                    AppError::Database(format!("Failed to commit batch deletion: {}", e))
                })?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_BATCHES)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    async fn delete_one(
        &self,
        user_id: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        client
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .parent(&parent)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    // ─── Folder Operations ───────────────────────────────────────

    async fn list_folders(
        &self,
        user_id: &str,
        kind: FolderKind,
    ) -> Result<Vec<FolderSummary>, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        client
            .fluent()
            .select()
            .from(kind.collection())
            .parent(&parent)
            .order_by([("createdAt", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    async fn insert_folder(&self, user_id: &str, folder: &FolderDocument) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;
        let collection = folder.kind().collection();
        let doc_id = folder.id().to_string();

        // The id lives in the document name, not in a field.
        let _: () = match folder {
            FolderDocument::Run(f) => {
                let mut doc = f.clone();
                doc.id.clear();
                client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(&doc_id)
                    .parent(&parent)
                    .object(&doc)
                    .execute()
                    .await
            }
            FolderDocument::Lift(f) => {
                let mut doc = f.clone();
                doc.id.clear();
                client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(&doc_id)
                    .parent(&parent)
                    .object(&doc)
                    .execute()
                    .await
            }
        }
        .map_err(db_error)?;

        Ok(())
    }

    async fn delete_folder(
        &self,
        user_id: &str,
        kind: FolderKind,
        folder_id: &str,
    ) -> Result<(), AppError> {
        self.delete_one(user_id, kind.collection(), folder_id).await
    }

    async fn get_run_folder(
        &self,
        user_id: &str,
        folder_id: &str,
    ) -> Result<Option<RunFolder>, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        client
            .fluent()
            .select()
            .by_id_in(collections::RUN_FOLDERS)
            .parent(&parent)
            .obj()
            .one(folder_id)
            .await
            .map_err(db_error)
    }

    /// Conditional replace of `runs`, read and written inside one transaction.
    async fn replace_runs(
        &self,
        user_id: &str,
        folder_id: &str,
        expected_revision: u64,
        runs: &[RunEntry],
    ) -> Result<u64, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Reads through this handle register the folder for conflict detection.
        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );

        let current: Option<RunFolder> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::RUN_FOLDERS)
            .parent(&parent)
            .obj()
            .one(folder_id)
            .await
            .map_err(|e| transaction_error("Failed to read folder in transaction", e))?;

        let Some(mut folder) = current else {
            let _ = transaction.rollback().await;
            return Err(folder_not_found());
        };

        if folder.revision != expected_revision {
            let _ = transaction.rollback().await;
            tracing::warn!(
                user_id,
                folder_id,
                expected_revision,
                found = folder.revision,
                "Stale run folder revision"
            );
            return Err(AppError::Conflict(AppError::STALE_REVISION.to_string()));
        }

        folder.id.clear();
        folder.runs = runs.to_vec();
        folder.revision = expected_revision + 1;

        client
            .fluent()
            .update()
            .fields(paths!(RunFolder::{runs, revision}))
            .in_col(collections::RUN_FOLDERS)
            .document_id(folder_id)
            .parent(&parent)
            .object(&folder)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add runs to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| transaction_error("Transaction commit failed", e))?;

        Ok(folder.revision)
    }

    async fn get_lift_folder(
        &self,
        user_id: &str,
        folder_id: &str,
    ) -> Result<Option<LiftFolder>, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        client
            .fluent()
            .select()
            .by_id_in(collections::LIFT_FOLDERS)
            .parent(&parent)
            .obj()
            .one(folder_id)
            .await
            .map_err(db_error)
    }

    /// Conditional replace of `exercises`, read and written inside one transaction.
    async fn replace_lift_days(
        &self,
        user_id: &str,
        folder_id: &str,
        expected_revision: u64,
        days: &[LiftDay],
    ) -> Result<u64, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );

        let current: Option<LiftFolder> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::LIFT_FOLDERS)
            .parent(&parent)
            .obj()
            .one(folder_id)
            .await
            .map_err(|e| transaction_error("Failed to read folder in transaction", e))?;

        let Some(mut folder) = current else {
            let _ = transaction.rollback().await;
            return Err(folder_not_found());
        };

        if folder.revision != expected_revision {
            let _ = transaction.rollback().await;
            tracing::warn!(
                user_id,
                folder_id,
                expected_revision,
                found = folder.revision,
                "Stale lift folder revision"
            );
            return Err(AppError::Conflict(AppError::STALE_REVISION.to_string()));
        }

        folder.id.clear();
        folder.exercises = days.to_vec();
        folder.revision = expected_revision + 1;

        client
            .fluent()
            .update()
            .fields(paths!(LiftFolder::{exercises, revision}))
            .in_col(collections::LIFT_FOLDERS)
            .document_id(folder_id)
            .parent(&parent)
            .object(&folder)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add exercises to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| transaction_error("Transaction commit failed", e))?;

        Ok(folder.revision)
    }

    // ─── Weight Operations ───────────────────────────────────────

    async fn insert_weight(&self, user_id: &str, record: &WeightRecord) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        let mut doc = record.clone();
        let doc_id = std::mem::take(&mut doc.id);

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::WEIGHT_FOLDER)
            .document_id(&doc_id)
            .parent(&parent)
            .object(&doc)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn list_weights(&self, user_id: &str) -> Result<Vec<WeightRecord>, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(db_error)?;

        client
            .fluent()
            .select()
            .from(collections::WEIGHT_FOLDER)
            .parent(&parent)
            .order_by([("date", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    async fn delete_weight(&self, user_id: &str, record_id: &str) -> Result<(), AppError> {
        self.delete_one(user_id, collections::WEIGHT_FOLDER, record_id)
            .await
    }

    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj::<User>()
            .one(user_id)
            .await
            .map(|user| user.map(|u| u.with_document_id(user_id)))
            .map_err(db_error)
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    // ─── Sweeps ──────────────────────────────────────────────────

    async fn delete_collection(
        &self,
        user_id: &str,
        collection: UserCollection,
    ) -> Result<usize, AppError> {
        let ids = self.list_document_ids(user_id, collection.name()).await?;
        let count = ids.len();
        self.batch_delete(user_id, collection.name(), &ids).await?;

        tracing::debug!(
            user_id,
            collection = collection.name(),
            count,
            "Deleted user sub-collection"
        );
        Ok(count)
    }
}
