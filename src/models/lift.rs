// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Lift date groups, exercises and sets.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::new_id;
use crate::time_utils::parse_calendar_date;

/// Weight or reps as entered: older clients stored the raw text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub enum Measure {
    Number(f64),
    Text(String),
}

impl Default for Measure {
    fn default() -> Self {
        Measure::Text(String::new())
    }
}

impl Measure {
    pub fn is_blank(&self) -> bool {
        match self {
            Measure::Number(n) => !n.is_finite(),
            Measure::Text(s) => s.trim().is_empty(),
        }
    }
}

/// One set of an exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct LiftSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub weight: Measure,
    #[serde(default)]
    pub reps: Measure,
    #[serde(default)]
    pub notes: String,
}

/// A named exercise and its sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Exercise {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sets: Vec<LiftSet>,
}

impl Exercise {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Every exercise needs a name.".to_string(),
            ));
        }
        validate_sets(&self.sets)
    }

    /// Give this exercise and its sets ids where they have none.
    pub fn assign_ids(&mut self) {
        if self.id.is_empty() {
            self.id = new_id();
        }
        for set in &mut self.sets {
            if set.id.is_empty() {
                set.id = new_id();
            }
        }
    }
}

fn validate_sets(sets: &[LiftSet]) -> Result<()> {
    if sets.is_empty() {
        return Err(AppError::Validation(
            "Every exercise needs at least one set.".to_string(),
        ));
    }
    if sets.iter().any(|s| s.weight.is_blank() || s.reps.is_blank()) {
        return Err(AppError::Validation(
            "Every set needs a weight and reps.".to_string(),
        ));
    }
    Ok(())
}

/// One calendar day's workout inside a lift folder's `exercises` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct LiftDay {
    pub date: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl LiftDay {
    /// Check the whole day before anything is written.
    pub fn validate(&self) -> Result<()> {
        if parse_calendar_date(&self.date).is_none() {
            return Err(AppError::Validation(
                "Date must be in YYYY-MM-DD format.".to_string(),
            ));
        }
        if self.exercises.is_empty() {
            return Err(AppError::Validation(
                "Add at least one exercise.".to_string(),
            ));
        }
        self.exercises.iter().try_for_each(Exercise::validate)
    }

    pub fn assign_ids(&mut self) {
        self.exercises.iter_mut().for_each(Exercise::assign_ids);
    }
}

/// Merge date groups that share a date into the first group for that date.
///
/// Keeps first-seen order of dates and of exercises within a date.
pub fn merge_same_date(days: Vec<LiftDay>) -> Vec<LiftDay> {
    let mut merged: Vec<LiftDay> = Vec::with_capacity(days.len());
    for day in days {
        match merged.iter_mut().find(|d| d.date == day.date) {
            Some(existing) => existing.exercises.extend(day.exercises),
            None => merged.push(day),
        }
    }
    merged
}

/// Fields to overwrite on an existing exercise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub sets: Option<Vec<LiftSet>>,
}

impl ExercisePatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation(
                    "Every exercise needs a name.".to_string(),
                ));
            }
        }
        if let Some(sets) = &self.sets {
            validate_sets(sets)?;
        }
        Ok(())
    }

    /// Shallow-merge onto `exercise`; replacement sets get ids.
    pub fn apply_to(self, exercise: &mut Exercise) {
        if let Some(name) = self.name {
            exercise.name = name.trim().to_string();
        }
        if let Some(sets) = self.sets {
            exercise.sets = sets;
        }
        exercise.assign_ids();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(weight: Measure, reps: Measure) -> LiftSet {
        LiftSet {
            id: String::new(),
            weight,
            reps,
            notes: String::new(),
        }
    }

    fn exercise(name: &str) -> Exercise {
        Exercise {
            id: String::new(),
            name: name.to_string(),
            sets: vec![set(Measure::Number(100.0), Measure::Number(5.0))],
        }
    }

    #[test]
    fn test_measure_accepts_numbers_and_text() {
        let s: LiftSet =
            serde_json::from_value(serde_json::json!({ "weight": "135", "reps": 8 })).unwrap();
        assert_eq!(s.weight, Measure::Text("135".to_string()));
        assert_eq!(s.reps, Measure::Number(8.0));
        assert!(!s.weight.is_blank());
    }

    #[test]
    fn test_blank_reps_rejected() {
        let day = LiftDay {
            date: "2024-03-04".to_string(),
            exercises: vec![Exercise {
                id: String::new(),
                name: "Squat".to_string(),
                sets: vec![set(Measure::Number(100.0), Measure::Text("  ".to_string()))],
            }],
        };
        assert!(matches!(day.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_bad_date_rejected() {
        let day = LiftDay {
            date: "03/04/24".to_string(),
            exercises: vec![exercise("Bench")],
        };
        assert!(day.validate().is_err());
    }

    #[test]
    fn test_assign_ids_fills_only_missing() {
        let mut ex = exercise("Row");
        ex.sets[0].id = "keep".to_string();
        ex.assign_ids();
        assert!(!ex.id.is_empty());
        assert_eq!(ex.sets[0].id, "keep");
    }

    #[test]
    fn test_merge_same_date() {
        let days = vec![
            LiftDay {
                date: "2024-01-02".to_string(),
                exercises: vec![exercise("A")],
            },
            LiftDay {
                date: "2024-01-01".to_string(),
                exercises: vec![exercise("B")],
            },
            LiftDay {
                date: "2024-01-02".to_string(),
                exercises: vec![exercise("C")],
            },
        ];
        let merged = merge_same_date(days);
        assert_eq!(merged.len(), 2);
        let names: Vec<&str> = merged[0].exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
