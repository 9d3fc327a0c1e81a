// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod account;
pub mod editor;
pub mod entries;
pub mod folders;
pub mod grouping;
pub mod session;
pub mod weight;

pub use account::{AccountPurge, PurgeReport};
pub use editor::{EntryEditor, ExerciseAddress, RunAddress};
pub use entries::EntryAppender;
pub use folders::FolderService;
pub use grouping::{group_by_date, DateGroup, Dated};
pub use session::{Credentials, RegisterRequest, SessionService, SignedIn};
pub use weight::WeightLog;
