// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Folder store: named run and lift folders under a user.
//!
//! Name uniqueness and the per-type cap are checked with one read before the
//! write. They are not store constraints, so two concurrent creations can
//! both pass the checks.

use std::sync::Arc;

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::{
    new_id, FolderDocument, FolderKind, FolderSummary, LiftFolder, RunFolder, Session,
};
use crate::time_utils::now_rfc3339;

/// Longest folder name accepted, in characters after trimming.
pub const MAX_FOLDER_NAME_CHARS: usize = 50;

pub(crate) fn folder_not_found() -> AppError {
    AppError::NotFound("Folder not found.".to_string())
}

/// Creates, lists, reads and deletes folders.
#[derive(Clone)]
pub struct FolderService {
    store: Arc<dyn DocumentStore>,
    max_folders: usize,
}

impl FolderService {
    pub fn new(store: Arc<dyn DocumentStore>, max_folders: usize) -> Self {
        Self { store, max_folders }
    }

    /// Folders of one type, oldest first.
    pub async fn list_folders(
        &self,
        session: &Session,
        kind: FolderKind,
    ) -> Result<Vec<FolderSummary>> {
        self.store.list_folders(&session.user_id, kind).await
    }

    pub async fn create_folder(
        &self,
        session: &Session,
        kind: FolderKind,
        name: &str,
    ) -> Result<FolderSummary> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Folder name cannot be empty.".to_string(),
            ));
        }
        if name.chars().count() > MAX_FOLDER_NAME_CHARS {
            return Err(AppError::Validation(format!(
                "Folder name must be {} characters or fewer.",
                MAX_FOLDER_NAME_CHARS
            )));
        }

        let existing = self.store.list_folders(&session.user_id, kind).await?;
        if existing.len() >= self.max_folders {
            return Err(AppError::LimitExceeded(self.max_folders));
        }
        if existing.iter().any(|f| f.folder_name == name) {
            return Err(AppError::DuplicateName(name.to_string()));
        }

        let folder = FolderDocument::new(kind, new_id(), name.to_string(), now_rfc3339());
        self.store.insert_folder(&session.user_id, &folder).await?;

        tracing::info!(
            user_id = %session.user_id,
            folder_id = folder.id(),
            kind = %kind,
            "Folder created"
        );

        Ok(folder.summary())
    }

    pub async fn get_run_folder(&self, session: &Session, folder_id: &str) -> Result<RunFolder> {
        self.store
            .get_run_folder(&session.user_id, folder_id)
            .await?
            .ok_or_else(folder_not_found)
    }

    pub async fn get_lift_folder(&self, session: &Session, folder_id: &str) -> Result<LiftFolder> {
        self.store
            .get_lift_folder(&session.user_id, folder_id)
            .await?
            .ok_or_else(folder_not_found)
    }

    /// Delete one folder document. Its entries go with it; nothing else is touched.
    pub async fn delete_folder(
        &self,
        session: &Session,
        kind: FolderKind,
        folder_id: &str,
    ) -> Result<()> {
        self.store
            .delete_folder(&session.user_id, kind, folder_id)
            .await?;
        tracing::info!(user_id = %session.user_id, folder_id, kind = %kind, "Folder deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn session() -> Session {
        Session {
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
        }
    }

    fn service(max: usize) -> FolderService {
        FolderService::new(Arc::new(MemoryStore::new()), max)
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let folders = service(10);
        let created = folders
            .create_folder(&session(), FolderKind::Run, "  Marathon Block ")
            .await
            .unwrap();
        assert_eq!(created.folder_name, "Marathon Block");
        assert!(!created.id.is_empty());
    }

    #[tokio::test]
    async fn test_empty_and_long_names_rejected() {
        let folders = service(10);
        let err = folders
            .create_folder(&session(), FolderKind::Lift, "   ")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Folder name cannot be empty.");

        let long = "x".repeat(MAX_FOLDER_NAME_CHARS + 1);
        assert!(matches!(
            folders
                .create_folder(&session(), FolderKind::Lift, &long)
                .await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_cap_applies_per_kind() {
        let folders = service(2);
        for name in ["A", "B"] {
            folders
                .create_folder(&session(), FolderKind::Run, name)
                .await
                .unwrap();
        }
        let err = folders
            .create_folder(&session(), FolderKind::Run, "C")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "You can only create up to 2 folders.");

        folders
            .create_folder(&session(), FolderKind::Lift, "A")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_folder() {
        let folders = service(10);
        let err = folders
            .get_run_folder(&session(), "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
