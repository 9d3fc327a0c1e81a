//! Database layer (Firestore, or in-process memory for development).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::{FailPoint, MemoryStore};

use crate::error::Result;
use crate::models::{
    FolderDocument, FolderKind, FolderSummary, LiftDay, LiftFolder, RunEntry, RunFolder, User,
    WeightRecord,
};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Root user documents (keyed by user id)
    pub const USERS: &str = "users";
    /// Sub-collections under `users/{userId}`
    pub const RUN_FOLDERS: &str = "runFolders";
    pub const LIFT_FOLDERS: &str = "liftFolders";
    pub const WEIGHT_FOLDER: &str = "weightFolder";
}

/// Sub-collections owned by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserCollection {
    RunFolders,
    LiftFolders,
    WeightRecords,
}

impl UserCollection {
    /// Order in which an account purge sweeps the sub-collections.
    pub const PURGE_ORDER: [UserCollection; 3] = [
        UserCollection::RunFolders,
        UserCollection::LiftFolders,
        UserCollection::WeightRecords,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UserCollection::RunFolders => collections::RUN_FOLDERS,
            UserCollection::LiftFolders => collections::LIFT_FOLDERS,
            UserCollection::WeightRecords => collections::WEIGHT_FOLDER,
        }
    }
}

/// Document storage used by every service.
///
/// Entry arrays are only ever replaced through the `replace_*` methods, which
/// succeed only if the folder's revision still equals `expected_revision`
/// (`AppError::Conflict` otherwise) and return the new revision.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ─── Folders ─────────────────────────────────────────────────

    /// All folders of `kind`, oldest first.
    async fn list_folders(&self, user_id: &str, kind: FolderKind) -> Result<Vec<FolderSummary>>;

    async fn insert_folder(&self, user_id: &str, folder: &FolderDocument) -> Result<()>;

    /// Delete one folder. Missing folders are not an error.
    async fn delete_folder(&self, user_id: &str, kind: FolderKind, folder_id: &str) -> Result<()>;

    async fn get_run_folder(&self, user_id: &str, folder_id: &str) -> Result<Option<RunFolder>>;

    async fn replace_runs(
        &self,
        user_id: &str,
        folder_id: &str,
        expected_revision: u64,
        runs: &[RunEntry],
    ) -> Result<u64>;

    async fn get_lift_folder(&self, user_id: &str, folder_id: &str)
        -> Result<Option<LiftFolder>>;

    async fn replace_lift_days(
        &self,
        user_id: &str,
        folder_id: &str,
        expected_revision: u64,
        days: &[LiftDay],
    ) -> Result<u64>;

    // ─── Weight records ──────────────────────────────────────────

    async fn insert_weight(&self, user_id: &str, record: &WeightRecord) -> Result<()>;

    /// All weight records, oldest date first.
    async fn list_weights(&self, user_id: &str) -> Result<Vec<WeightRecord>>;

    async fn delete_weight(&self, user_id: &str, record_id: &str) -> Result<()>;

    // ─── Root user document ──────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    async fn upsert_user(&self, user: &User) -> Result<()>;

    async fn delete_user(&self, user_id: &str) -> Result<()>;

    /// Delete every document in one of the user's sub-collections.
    ///
    /// Returns the number of documents deleted.
    async fn delete_collection(&self, user_id: &str, collection: UserCollection) -> Result<usize>;
}
