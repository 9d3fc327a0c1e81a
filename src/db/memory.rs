// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store for local development and tests.
//!
//! Mirrors the Firestore layout: one bucket per user holding the root
//! profile and the three sub-collections. Fail points let tests make
//! individual operations fail or lose a race.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::db::{DocumentStore, UserCollection};
use crate::error::{AppError, Result};
use crate::models::{
    FolderDocument, FolderKind, FolderSummary, LiftDay, LiftFolder, RunEntry, RunFolder, User,
    WeightRecord,
};

/// Operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Sweeping one sub-collection
    Sweep(UserCollection),
    /// Deleting the root user document
    DeleteUser,
    /// Any `replace_runs` / `replace_lift_days`
    EntryWrite,
    /// Another writer bumps the folder revision just before the next replace
    RacingWriter,
}

#[derive(Debug, Clone)]
struct Trigger {
    message: String,
    /// `None` fires forever
    remaining: Option<usize>,
}

#[derive(Debug, Default)]
struct UserBucket {
    profile: Option<User>,
    run_folders: Vec<RunFolder>,
    lift_folders: Vec<LiftFolder>,
    weights: Vec<WeightRecord>,
}

/// Memory-backed [`DocumentStore`]. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<String, UserBucket>>,
    fail_points: Arc<DashMap<FailPoint, Trigger>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `point` fail with `message` until cleared.
    pub fn fail_on(&self, point: FailPoint, message: impl Into<String>) {
        self.fail_points.insert(
            point,
            Trigger {
                message: message.into(),
                remaining: None,
            },
        );
    }

    /// Make `point` fire `times` times, then behave normally.
    pub fn fail_times(&self, point: FailPoint, times: usize, message: impl Into<String>) {
        self.fail_points.insert(
            point,
            Trigger {
                message: message.into(),
                remaining: Some(times),
            },
        );
    }

    pub fn clear_fail_point(&self, point: FailPoint) {
        self.fail_points.remove(&point);
    }

    /// Number of documents in one of the user's sub-collections.
    /// Store a raw user document under `user_id`, as written by older clients.
    pub fn insert_user_document(&self, user_id: &str, doc: serde_json::Value) -> Result<()> {
        let user: User = serde_json::from_value(doc)
            .map_err(|e| AppError::Database(format!("Invalid user document: {}", e)))?;
        self.users.entry(user_id.to_string()).or_default().profile = Some(user);
        Ok(())
    }

    pub fn collection_len(&self, user_id: &str, collection: UserCollection) -> usize {
        self.users.get(user_id).map_or(0, |b| match collection {
            UserCollection::RunFolders => b.run_folders.len(),
            UserCollection::LiftFolders => b.lift_folders.len(),
            UserCollection::WeightRecords => b.weights.len(),
        })
    }

    /// Consume one firing of `point`, returning its message if it fired.
    fn fire(&self, point: FailPoint) -> Option<String> {
        let mut trigger = self.fail_points.get_mut(&point)?;
        let message = trigger.message.clone();
        match trigger.remaining {
            None => Some(message),
            Some(0) => {
                drop(trigger);
                self.fail_points.remove(&point);
                None
            }
            Some(n) => {
                trigger.remaining = Some(n - 1);
                if n == 1 {
                    drop(trigger);
                    self.fail_points.remove(&point);
                }
                Some(message)
            }
        }
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        match self.fire(point) {
            Some(message) => Err(AppError::Database(message)),
            None => Ok(()),
        }
    }

    /// Shared compare-and-set logic for both folder kinds.
    fn check_revision(
        &self,
        user_id: &str,
        folder_id: &str,
        revision: &mut u64,
        expected: u64,
    ) -> Result<()> {
        self.check(FailPoint::EntryWrite)?;
        if self.fire(FailPoint::RacingWriter).is_some() {
            *revision += 1;
        }
        if *revision != expected {
            tracing::warn!(
                user_id,
                folder_id,
                expected_revision = expected,
                found = *revision,
                "Stale folder revision"
            );
            return Err(AppError::Conflict(AppError::STALE_REVISION.to_string()));
        }
        Ok(())
    }
}

fn folder_not_found() -> AppError {
    AppError::NotFound("Folder not found.".to_string())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_folders(&self, user_id: &str, kind: FolderKind) -> Result<Vec<FolderSummary>> {
        let Some(bucket) = self.users.get(user_id) else {
            return Ok(Vec::new());
        };
        let mut folders: Vec<FolderSummary> = match kind {
            FolderKind::Run => bucket
                .run_folders
                .iter()
                .map(|f| FolderDocument::Run(f.clone()).summary())
                .collect(),
            FolderKind::Lift => bucket
                .lift_folders
                .iter()
                .map(|f| FolderDocument::Lift(f.clone()).summary())
                .collect(),
        };
        folders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(folders)
    }

    async fn insert_folder(&self, user_id: &str, folder: &FolderDocument) -> Result<()> {
        let mut bucket = self.users.entry(user_id.to_string()).or_default();
        match folder {
            FolderDocument::Run(f) => {
                bucket.run_folders.retain(|existing| existing.id != f.id);
                bucket.run_folders.push(f.clone());
            }
            FolderDocument::Lift(f) => {
                bucket.lift_folders.retain(|existing| existing.id != f.id);
                bucket.lift_folders.push(f.clone());
            }
        }
        Ok(())
    }

    async fn delete_folder(&self, user_id: &str, kind: FolderKind, folder_id: &str) -> Result<()> {
        if let Some(mut bucket) = self.users.get_mut(user_id) {
            match kind {
                FolderKind::Run => bucket.run_folders.retain(|f| f.id != folder_id),
                FolderKind::Lift => bucket.lift_folders.retain(|f| f.id != folder_id),
            }
        }
        Ok(())
    }

    async fn get_run_folder(&self, user_id: &str, folder_id: &str) -> Result<Option<RunFolder>> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|b| b.run_folders.iter().find(|f| f.id == folder_id).cloned()))
    }

    async fn replace_runs(
        &self,
        user_id: &str,
        folder_id: &str,
        expected_revision: u64,
        runs: &[RunEntry],
    ) -> Result<u64> {
        let mut bucket = self.users.get_mut(user_id).ok_or_else(folder_not_found)?;
        let folder = bucket
            .run_folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or_else(folder_not_found)?;

        self.check_revision(user_id, folder_id, &mut folder.revision, expected_revision)?;

        folder.runs = runs.to_vec();
        folder.revision += 1;
        Ok(folder.revision)
    }

    async fn get_lift_folder(&self, user_id: &str, folder_id: &str) -> Result<Option<LiftFolder>> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|b| b.lift_folders.iter().find(|f| f.id == folder_id).cloned()))
    }

    async fn replace_lift_days(
        &self,
        user_id: &str,
        folder_id: &str,
        expected_revision: u64,
        days: &[LiftDay],
    ) -> Result<u64> {
        let mut bucket = self.users.get_mut(user_id).ok_or_else(folder_not_found)?;
        let folder = bucket
            .lift_folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or_else(folder_not_found)?;

        self.check_revision(user_id, folder_id, &mut folder.revision, expected_revision)?;

        folder.exercises = days.to_vec();
        folder.revision += 1;
        Ok(folder.revision)
    }

    async fn insert_weight(&self, user_id: &str, record: &WeightRecord) -> Result<()> {
        let mut bucket = self.users.entry(user_id.to_string()).or_default();
        bucket.weights.retain(|w| w.id != record.id);
        bucket.weights.push(record.clone());
        Ok(())
    }

    async fn list_weights(&self, user_id: &str) -> Result<Vec<WeightRecord>> {
        let mut weights = self
            .users
            .get(user_id)
            .map(|b| b.weights.clone())
            .unwrap_or_default();
        weights.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(weights)
    }

    async fn delete_weight(&self, user_id: &str, record_id: &str) -> Result<()> {
        if let Some(mut bucket) = self.users.get_mut(user_id) {
            bucket.weights.retain(|w| w.id != record_id);
        }
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|b| b.profile.clone())
            .map(|u| u.with_document_id(user_id)))
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.users
            .entry(user.user_id.clone())
            .or_default()
            .profile = Some(user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.check(FailPoint::DeleteUser)?;
        if let Some(mut bucket) = self.users.get_mut(user_id) {
            bucket.profile = None;
        }
        // Drop the bucket once nothing is left under it.
        self.users.remove_if(user_id, |_, b| {
            b.profile.is_none()
                && b.run_folders.is_empty()
                && b.lift_folders.is_empty()
                && b.weights.is_empty()
        });
        Ok(())
    }

    async fn delete_collection(&self, user_id: &str, collection: UserCollection) -> Result<usize> {
        self.check(FailPoint::Sweep(collection))?;
        let Some(mut bucket) = self.users.get_mut(user_id) else {
            return Ok(0);
        };
        let count = match collection {
            UserCollection::RunFolders => std::mem::take(&mut bucket.run_folders).len(),
            UserCollection::LiftFolders => std::mem::take(&mut bucket.lift_folders).len(),
            UserCollection::WeightRecords => std::mem::take(&mut bucket.weights).len(),
        };
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_folder(id: &str, created_at: &str) -> FolderDocument {
        FolderDocument::new(
            FolderKind::Run,
            id.to_string(),
            format!("Folder {}", id),
            created_at.to_string(),
        )
    }

    #[tokio::test]
    async fn test_list_folders_oldest_first() {
        let store = MemoryStore::new();
        store
            .insert_folder("u1", &run_folder("b", "2024-02-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .insert_folder("u1", &run_folder("a", "2024-01-01T00:00:00Z"))
            .await
            .unwrap();

        let folders = store.list_folders("u1", FolderKind::Run).await.unwrap();
        let ids: Vec<&str> = folders.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store
            .list_folders("u1", FolderKind::Lift)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_replace_runs_bumps_revision() {
        let store = MemoryStore::new();
        store
            .insert_folder("u1", &run_folder("f", "2024-01-01T00:00:00Z"))
            .await
            .unwrap();

        assert_eq!(store.replace_runs("u1", "f", 0, &[]).await.unwrap(), 1);
        assert_eq!(store.replace_runs("u1", "f", 1, &[]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stale_revision_is_rejected() {
        let store = MemoryStore::new();
        store
            .insert_folder("u1", &run_folder("f", "2024-01-01T00:00:00Z"))
            .await
            .unwrap();
        store.replace_runs("u1", "f", 0, &[]).await.unwrap();

        let err = store.replace_runs("u1", "f", 0, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let folder = store.get_run_folder("u1", "f").await.unwrap().unwrap();
        assert_eq!(folder.revision, 1);
    }

    #[tokio::test]
    async fn test_racing_writer_fires_once() {
        let store = MemoryStore::new();
        store
            .insert_folder("u1", &run_folder("f", "2024-01-01T00:00:00Z"))
            .await
            .unwrap();
        store.fail_times(FailPoint::RacingWriter, 1, "race");

        assert!(store.replace_runs("u1", "f", 0, &[]).await.is_err());
        assert_eq!(store.replace_runs("u1", "f", 1, &[]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_replace_on_missing_folder() {
        let store = MemoryStore::new();
        let err = store.replace_lift_days("u1", "nope", 0, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sweep_fail_point() {
        let store = MemoryStore::new();
        store
            .insert_folder("u1", &run_folder("f", "2024-01-01T00:00:00Z"))
            .await
            .unwrap();
        store.fail_on(FailPoint::Sweep(UserCollection::RunFolders), "unavailable");

        assert!(store
            .delete_collection("u1", UserCollection::RunFolders)
            .await
            .is_err());
        assert_eq!(store.collection_len("u1", UserCollection::RunFolders), 1);

        store.clear_fail_point(FailPoint::Sweep(UserCollection::RunFolders));
        assert_eq!(
            store
                .delete_collection("u1", UserCollection::RunFolders)
                .await
                .unwrap(),
            1
        );
    }
}
