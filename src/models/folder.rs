// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Run and lift folder documents.
//!
//! Stored at `users/{userId}/runFolders/{folderId}` and
//! `users/{userId}/liftFolders/{folderId}`. Field names are camelCase in
//! Firestore and over the API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::collections;
use crate::models::{LiftDay, RunEntry};

/// Folder type. Each type is its own namespace for names and its own count limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKind {
    Run,
    Lift,
}

impl FolderKind {
    /// Sub-collection under the user document holding this folder type.
    pub fn collection(self) -> &'static str {
        match self {
            FolderKind::Run => collections::RUN_FOLDERS,
            FolderKind::Lift => collections::LIFT_FOLDERS,
        }
    }
}

impl std::fmt::Display for FolderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FolderKind::Run => f.write_str("run"),
            FolderKind::Lift => f.write_str("lift"),
        }
    }
}

/// Folder without its entries, as listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FolderSummary {
    /// Document ID (filled from the Firestore document name on read)
    #[serde(alias = "_firestore_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub folder_name: String,
    /// Creation time (RFC3339)
    pub created_at: String,
}

/// Run folder with its runs, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFolder {
    #[serde(alias = "_firestore_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub folder_name: String,
    pub created_at: String,
    /// Bumped on every entry write; writes are conditional on it.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub runs: Vec<RunEntry>,
}

/// Lift folder with its date groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftFolder {
    #[serde(alias = "_firestore_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub folder_name: String,
    pub created_at: String,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub exercises: Vec<LiftDay>,
}

/// A folder document of either type.
#[derive(Debug, Clone, PartialEq)]
pub enum FolderDocument {
    Run(RunFolder),
    Lift(LiftFolder),
}

impl FolderDocument {
    /// A fresh, empty folder.
    pub fn new(kind: FolderKind, id: String, folder_name: String, created_at: String) -> Self {
        match kind {
            FolderKind::Run => FolderDocument::Run(RunFolder {
                id,
                folder_name,
                created_at,
                revision: 0,
                runs: Vec::new(),
            }),
            FolderKind::Lift => FolderDocument::Lift(LiftFolder {
                id,
                folder_name,
                created_at,
                revision: 0,
                exercises: Vec::new(),
            }),
        }
    }

    pub fn kind(&self) -> FolderKind {
        match self {
            FolderDocument::Run(_) => FolderKind::Run,
            FolderDocument::Lift(_) => FolderKind::Lift,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            FolderDocument::Run(f) => &f.id,
            FolderDocument::Lift(f) => &f.id,
        }
    }

    pub fn summary(&self) -> FolderSummary {
        let (id, folder_name, created_at) = match self {
            FolderDocument::Run(f) => (&f.id, &f.folder_name, &f.created_at),
            FolderDocument::Lift(f) => (&f.id, &f.folder_name, &f.created_at),
        };
        FolderSummary {
            id: id.clone(),
            folder_name: folder_name.clone(),
            created_at: created_at.clone(),
        }
    }
}
