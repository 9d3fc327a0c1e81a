// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry appender: adds a run or a day of lifts to a folder.
//!
//! Appends commute, so a write that loses the revision race is retried
//! against a fresh read of the folder.

use std::sync::Arc;

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::lift::merge_same_date;
use crate::models::run::assign_missing_ids;
use crate::models::{new_id, LiftDay, NewRun, RunEntry, Session};
use crate::services::folders::folder_not_found;
use crate::time_utils::today_local;

/// Attempts per append before a revision conflict is returned.
pub const MAX_APPEND_ATTEMPTS: usize = 3;

/// Entry writes that fail in the store surface as `Save` with the store's message.
pub(crate) fn save_error(err: AppError) -> AppError {
    match err {
        AppError::Database(msg) => AppError::Save(msg),
        other => other,
    }
}

#[derive(Clone)]
pub struct EntryAppender {
    store: Arc<dyn DocumentStore>,
}

impl EntryAppender {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate `run`, date it today and append it to the folder's runs.
    pub async fn append_run(
        &self,
        session: &Session,
        folder_id: &str,
        run: NewRun,
    ) -> Result<RunEntry> {
        let entry = run.into_entry(new_id(), today_local())?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let folder = self
                .store
                .get_run_folder(&session.user_id, folder_id)
                .await?
                .ok_or_else(folder_not_found)?;

            let mut runs = folder.runs;
            runs.push(entry.clone());
            assign_missing_ids(&mut runs);

            match self
                .store
                .replace_runs(&session.user_id, folder_id, folder.revision, &runs)
                .await
            {
                Ok(revision) => {
                    tracing::info!(
                        user_id = %session.user_id,
                        folder_id,
                        run_id = %entry.id,
                        revision,
                        "Run appended"
                    );
                    return Ok(entry);
                }
                Err(AppError::Conflict(_)) if attempt < MAX_APPEND_ATTEMPTS => {
                    tracing::debug!(folder_id, attempt, "Run append lost a race, retrying");
                }
                Err(e) => {
                    tracing::error!(folder_id, error = %e, "Failed to append run");
                    return Err(save_error(e));
                }
            }
        }
    }

    /// Validate `day` and add it to the folder, merging into an existing
    /// group for the same date.
    pub async fn append_lift(
        &self,
        session: &Session,
        folder_id: &str,
        mut day: LiftDay,
    ) -> Result<LiftDay> {
        day.validate()?;
        day.date = day.date.trim().to_string();
        day.assign_ids();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let folder = self
                .store
                .get_lift_folder(&session.user_id, folder_id)
                .await?
                .ok_or_else(folder_not_found)?;

            let mut days = folder.exercises;
            days.push(day.clone());
            let mut days = merge_same_date(days);
            days.iter_mut().for_each(LiftDay::assign_ids);

            match self
                .store
                .replace_lift_days(&session.user_id, folder_id, folder.revision, &days)
                .await
            {
                Ok(revision) => {
                    tracing::info!(
                        user_id = %session.user_id,
                        folder_id,
                        date = %day.date,
                        exercises = day.exercises.len(),
                        revision,
                        "Lift day appended"
                    );
                    return Ok(day);
                }
                Err(AppError::Conflict(_)) if attempt < MAX_APPEND_ATTEMPTS => {
                    tracing::debug!(folder_id, attempt, "Lift append lost a race, retrying");
                }
                Err(e) => {
                    tracing::error!(folder_id, error = %e, "Failed to append lift day");
                    return Err(save_error(e));
                }
            }
        }
    }
}
