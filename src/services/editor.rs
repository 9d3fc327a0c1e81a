// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry editor: locate one run or exercise in a folder and patch it.
//!
//! Entries can be addressed by stable id, or by the position a client saw in
//! the date-grouped view. Writes are conditional on the revision read and are
//! never retried, so an edit that raced another write fails with `Conflict`.

use std::sync::Arc;

use serde::Deserialize;

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::lift::merge_same_date;
use crate::models::run::assign_missing_ids;
use crate::models::{Exercise, ExercisePatch, LiftDay, RunEntry, RunPatch, Session};
use crate::services::entries::save_error;
use crate::services::folders::folder_not_found;

/// Which run to edit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RunAddress {
    /// The `run_index`-th run (zero-based) dated `run_date`, in stored order
    #[serde(rename_all = "camelCase")]
    Occurrence { run_date: String, run_index: usize },
    Id(String),
}

/// Which exercise to edit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExerciseAddress {
    /// The `lift_index`-th exercise (zero-based) in the date group for `lift_date`
    #[serde(rename_all = "camelCase")]
    Position { lift_date: String, lift_index: usize },
    Id(String),
}

fn locate_run(runs: &[RunEntry], address: &RunAddress) -> Result<usize> {
    let position = match address {
        RunAddress::Occurrence {
            run_date,
            run_index,
        } => runs
            .iter()
            .enumerate()
            .filter(|(_, r)| r.date == *run_date)
            .nth(*run_index)
            .map(|(i, _)| i),
        RunAddress::Id(id) => runs.iter().position(|r| !id.is_empty() && r.id == *id),
    };
    position.ok_or_else(|| AppError::NotFound("Run not found at given index.".to_string()))
}

fn locate_exercise<'a>(
    days: &'a mut [LiftDay],
    address: &ExerciseAddress,
) -> Result<&'a mut Exercise> {
    match address {
        ExerciseAddress::Position {
            lift_date,
            lift_index,
        } => {
            let day = days
                .iter_mut()
                .find(|d| d.date == *lift_date)
                .ok_or_else(|| AppError::NotFound("No matching date group.".to_string()))?;
            day.exercises.get_mut(*lift_index).ok_or_else(|| {
                AppError::NotFound("Exercise not found at given index.".to_string())
            })
        }
        ExerciseAddress::Id(id) => days
            .iter_mut()
            .flat_map(|d| d.exercises.iter_mut())
            .find(|e| !id.is_empty() && e.id == *id)
            .ok_or_else(|| AppError::NotFound("Exercise not found.".to_string())),
    }
}

#[derive(Clone)]
pub struct EntryEditor {
    store: Arc<dyn DocumentStore>,
}

impl EntryEditor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Shallow-merge `patch` onto the addressed run and write the folder back.
    pub async fn update_run(
        &self,
        session: &Session,
        folder_id: &str,
        address: &RunAddress,
        patch: RunPatch,
    ) -> Result<RunEntry> {
        patch.validate()?;

        let folder = self
            .store
            .get_run_folder(&session.user_id, folder_id)
            .await?
            .ok_or_else(folder_not_found)?;

        let mut runs = folder.runs;
        let index = locate_run(&runs, address)?;
        patch.apply_to(&mut runs[index]);
        assign_missing_ids(&mut runs);

        let revision = self
            .store
            .replace_runs(&session.user_id, folder_id, folder.revision, &runs)
            .await
            .map_err(save_error)?;

        tracing::info!(
            user_id = %session.user_id,
            folder_id,
            run_id = %runs[index].id,
            revision,
            "Run updated"
        );

        Ok(runs.swap_remove(index))
    }

    /// Shallow-merge `patch` onto the addressed exercise and write the folder back.
    ///
    /// Same-date groups left by older writers are merged first, so positions
    /// match the grouped view.
    pub async fn update_lift(
        &self,
        session: &Session,
        folder_id: &str,
        address: &ExerciseAddress,
        patch: ExercisePatch,
    ) -> Result<Exercise> {
        patch.validate()?;

        let folder = self
            .store
            .get_lift_folder(&session.user_id, folder_id)
            .await?
            .ok_or_else(folder_not_found)?;

        let mut days = merge_same_date(folder.exercises);
        let exercise = locate_exercise(&mut days, address)?;
        patch.apply_to(exercise);
        let updated = exercise.clone();
        days.iter_mut().for_each(LiftDay::assign_ids);

        let revision = self
            .store
            .replace_lift_days(&session.user_id, folder_id, folder.revision, &days)
            .await
            .map_err(save_error)?;

        tracing::info!(
            user_id = %session.user_id,
            folder_id,
            exercise_id = %updated.id,
            revision,
            "Exercise updated"
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, date: &str, name: &str) -> RunEntry {
        RunEntry {
            id: id.to_string(),
            date: date.to_string(),
            name: name.to_string(),
            distance: 5.0,
            pace: "5:00".to_string(),
            duration: "0:25:00".to_string(),
            heart_rate: None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_occurrence_counts_only_matching_dates() {
        let runs = vec![
            run("a", "2024-01-01", "A"),
            run("b", "2024-01-02", "B"),
            run("c", "2024-01-01", "C"),
        ];
        let address = RunAddress::Occurrence {
            run_date: "2024-01-01".to_string(),
            run_index: 1,
        };
        assert_eq!(locate_run(&runs, &address).unwrap(), 2);

        let address = RunAddress::Occurrence {
            run_date: "2024-01-01".to_string(),
            run_index: 2,
        };
        assert!(locate_run(&runs, &address).is_err());
    }

    #[test]
    fn test_empty_id_never_matches_legacy_run() {
        let runs = vec![run("", "2024-01-01", "Legacy")];
        assert!(locate_run(&runs, &RunAddress::Id(String::new())).is_err());
    }

    #[test]
    fn test_address_deserializes_both_shapes() {
        let by_position: RunAddress =
            serde_json::from_value(serde_json::json!({ "runDate": "2024-01-01", "runIndex": 0 }))
                .unwrap();
        assert!(matches!(by_position, RunAddress::Occurrence { .. }));

        let by_id: ExerciseAddress = serde_json::from_value(serde_json::json!("ex-1")).unwrap();
        assert_eq!(by_id, ExerciseAddress::Id("ex-1".to_string()));
    }
}
