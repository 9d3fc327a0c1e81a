// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod folder;
pub mod lift;
pub mod run;
pub mod user;
pub mod weight;

pub use folder::{FolderDocument, FolderKind, FolderSummary, LiftFolder, RunFolder};
pub use lift::{Exercise, ExercisePatch, LiftDay, LiftSet, Measure};
pub use run::{NewRun, RunEntry, RunPatch};
pub use user::{Session, User};
pub use weight::{NewWeight, WeightRecord};

/// Generate a new stable identifier for a document, entry, exercise or set.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
