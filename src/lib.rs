// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! fitlog: backend for a run, lift and body-weight training log
//!
//! This crate provides the HTTP API and the business rules behind it:
//! folder caps and naming, entry validation, date grouping, positional
//! and id-based edits, and full account purge.

pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::DocumentStore;
use identity::IdentityProvider;
use services::{
    AccountPurge, EntryAppender, EntryEditor, FolderService, SessionService, WeightLog,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub folders: FolderService,
    pub appender: EntryAppender,
    pub editor: EntryEditor,
    pub weights: WeightLog,
    pub sessions: SessionService,
    pub purge: AccountPurge,
}

impl AppState {
    /// Wire every service to the given backends.
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            folders: FolderService::new(store.clone(), config.max_folders_per_kind),
            appender: EntryAppender::new(store.clone()),
            editor: EntryEditor::new(store.clone()),
            weights: WeightLog::new(store.clone()),
            sessions: SessionService::new(store.clone(), identity.clone()),
            purge: AccountPurge::new(store.clone(), identity.clone()),
            config,
            store,
            identity,
        }
    }
}
