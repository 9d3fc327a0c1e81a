// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Run entries, their input/patch shapes, and pace/duration handling.

use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};

const MISSING_FIELDS: &str = "Please fill out all required fields.";
const INVALID_DISTANCE: &str = "Distance must be a positive number of kilometers.";
const INVALID_PACE: &str = "Pace must be in x:xx or xx:xx format.";
const INVALID_DURATION: &str = "Duration must be in h:mm:ss or mm:ss format.";

/// A run stored inside a run folder's `runs` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunEntry {
    /// Stable entry id; empty for runs written before ids existed
    #[serde(default)]
    pub id: String,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    pub name: String,
    /// Distance in kilometers
    pub distance: f64,
    /// Minutes and seconds per km ("5:15")
    pub pace: String,
    /// Elapsed time ("1:02:30")
    pub duration: String,
    #[serde(default)]
    pub heart_rate: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

impl RunEntry {
    /// Elapsed time estimated from distance and pace.
    pub fn estimated_duration(&self) -> Option<String> {
        estimate_duration(self.distance, &self.pace)
    }
}

/// Give runs written before ids existed an id.
pub fn assign_missing_ids(runs: &mut [RunEntry]) {
    for run in runs.iter_mut().filter(|r| r.id.is_empty()) {
        run.id = crate::models::new_id();
    }
}

/// A run as submitted by the client; the date is assigned on append.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewRun {
    pub name: String,
    pub distance: Option<f64>,
    pub pace: String,
    pub duration: String,
    pub heart_rate: Option<u32>,
    pub notes: String,
}

impl NewRun {
    /// Validate and turn into a stored entry dated `date`.
    pub fn into_entry(self, id: String, date: String) -> Result<RunEntry> {
        let name = self.name.trim();
        let (Some(distance), false, false, false) = (
            self.distance,
            name.is_empty(),
            self.pace.trim().is_empty(),
            self.duration.trim().is_empty(),
        ) else {
            return Err(AppError::Validation(MISSING_FIELDS.to_string()));
        };

        validate_distance(distance)?;
        validate_pace(&self.pace)?;
        let duration = normalize_duration(&self.duration)
            .ok_or_else(|| AppError::Validation(INVALID_DURATION.to_string()))?;

        Ok(RunEntry {
            id,
            date,
            name: name.to_string(),
            distance,
            pace: self.pace.trim().to_string(),
            duration,
            heart_rate: self.heart_rate,
            notes: self.notes,
        })
    }
}

/// Fields to overwrite on an existing run. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunPatch {
    pub name: Option<String>,
    pub distance: Option<f64>,
    pub pace: Option<String>,
    pub duration: Option<String>,
    /// `null` clears the heart rate, absence keeps it
    #[serde(deserialize_with = "double_option")]
    pub heart_rate: Option<Option<u32>>,
    pub notes: Option<String>,
}

impl RunPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation(MISSING_FIELDS.to_string()));
            }
        }
        if let Some(distance) = self.distance {
            validate_distance(distance)?;
        }
        if let Some(pace) = &self.pace {
            validate_pace(pace)?;
        }
        if let Some(duration) = &self.duration {
            validate_duration(duration)?;
        }
        Ok(())
    }

    /// Shallow-merge onto `entry`.
    pub fn apply_to(self, entry: &mut RunEntry) {
        if let Some(name) = self.name {
            entry.name = name.trim().to_string();
        }
        if let Some(distance) = self.distance {
            entry.distance = distance;
        }
        if let Some(pace) = self.pace {
            entry.pace = pace.trim().to_string();
        }
        if let Some(duration) = self.duration {
            entry.duration =
                normalize_duration(&duration).unwrap_or_else(|| duration.trim().to_string());
        }
        if let Some(heart_rate) = self.heart_rate {
            entry.heart_rate = heart_rate;
        }
        if let Some(notes) = self.notes {
            entry.notes = notes;
        }
    }
}

fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_distance(distance: f64) -> Result<()> {
    if distance.is_finite() && distance > 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation(INVALID_DISTANCE.to_string()))
    }
}

fn validate_pace(pace: &str) -> Result<()> {
    parse_pace(pace)
        .map(|_| ())
        .ok_or_else(|| AppError::Validation(INVALID_PACE.to_string()))
}

fn validate_duration(duration: &str) -> Result<()> {
    normalize_duration(duration)
        .map(|_| ())
        .ok_or_else(|| AppError::Validation(INVALID_DURATION.to_string()))
}

/// Parse one clock field: `width` digits exactly, or 1..=2 digits when `width` is None.
fn clock_field(raw: &str, width: Option<usize>) -> Option<u32> {
    let ok_len = match width {
        Some(w) => raw.len() == w,
        None => (1..=2).contains(&raw.len()),
    };
    if !ok_len || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parse a pace ("M:SS" or "MM:SS" per km) into seconds per km.
pub fn parse_pace(raw: &str) -> Option<u32> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    let minutes = clock_field(minutes, None)?;
    let seconds = clock_field(seconds, Some(2))?;
    (seconds < 60).then_some(minutes * 60 + seconds)
}

/// Parse a duration ("H:MM:SS" or "HH:MM:SS") into seconds.
pub fn parse_duration(raw: &str) -> Option<u32> {
    let mut parts = raw.trim().split(':');
    let hours = clock_field(parts.next()?, None)?;
    let minutes = clock_field(parts.next()?, Some(2))?;
    let seconds = clock_field(parts.next()?, Some(2))?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Canonical "H:MM:SS" form of a duration. Short "MM:SS" entries are
/// accepted and carried into hours ("26:15" is "0:26:15", "75:00" is "1:15:00").
pub fn normalize_duration(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if parse_duration(raw).is_some() {
        return Some(raw.to_string());
    }
    let (minutes, seconds) = raw.split_once(':')?;
    let minutes = clock_field(minutes, None)?;
    let seconds = clock_field(seconds, Some(2))?;
    (seconds < 60).then(|| format_duration(u64::from(minutes * 60 + seconds)))
}

/// Format seconds as "H:MM:SS".
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// Elapsed time for `distance_km` at `pace`, rounded to the second.
pub fn estimate_duration(distance_km: f64, pace: &str) -> Option<String> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return None;
    }
    let seconds_per_km = parse_pace(pace)?;
    let total = (distance_km * f64::from(seconds_per_km)).round() as u64;
    Some(format_duration(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_run() -> NewRun {
        NewRun {
            name: "Morning Run".to_string(),
            distance: Some(5.0),
            pace: "5:15".to_string(),
            duration: "0:26:15".to_string(),
            heart_rate: None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_parse_pace() {
        assert_eq!(parse_pace("5:15"), Some(315));
        assert_eq!(parse_pace("10:05"), Some(605));
        assert_eq!(parse_pace("5:5"), None);
        assert_eq!(parse_pace("5:60"), None);
        assert_eq!(parse_pace("123:00"), None);
        assert_eq!(parse_pace("five"), None);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1:00:00"), Some(3600));
        assert_eq!(parse_duration("00:26:15"), Some(1575));
        assert_eq!(parse_duration("1:60:00"), None);
        assert_eq!(parse_duration("26:15"), None);
        assert_eq!(parse_duration("1:00:00:00"), None);
    }

    #[test]
    fn test_normalize_duration() {
        assert_eq!(normalize_duration("1:02:30"), Some("1:02:30".to_string()));
        assert_eq!(normalize_duration(" 26:15 "), Some("0:26:15".to_string()));
        assert_eq!(normalize_duration("75:00"), Some("1:15:00".to_string()));
        assert_eq!(normalize_duration("26:75"), None);
        assert_eq!(normalize_duration("145:00"), None);
        assert_eq!(normalize_duration("soon"), None);
    }

    #[test]
    fn test_estimate_duration() {
        assert_eq!(estimate_duration(5.0, "5:15"), Some("0:26:15".to_string()));
        assert_eq!(estimate_duration(21.1, "6:00"), Some("2:06:36".to_string()));
        assert_eq!(estimate_duration(5.0, "bad"), None);
    }

    #[test]
    fn test_new_run_requires_fields() {
        let mut run = new_run();
        run.pace = String::new();
        let err = run.into_entry("id".into(), "2024-01-01".into()).unwrap_err();
        assert_eq!(err.to_string(), MISSING_FIELDS);

        let mut run = new_run();
        run.distance = None;
        assert!(run.into_entry("id".into(), "2024-01-01".into()).is_err());
    }

    #[test]
    fn test_new_run_rejects_bad_formats() {
        let mut run = new_run();
        run.duration = "26:15:1".to_string();
        let err = run.into_entry("id".into(), "2024-01-01".into()).unwrap_err();
        assert_eq!(err.to_string(), INVALID_DURATION);

        let mut run = new_run();
        run.distance = Some(-1.0);
        let err = run.into_entry("id".into(), "2024-01-01".into()).unwrap_err();
        assert_eq!(err.to_string(), INVALID_DISTANCE);
    }

    #[test]
    fn test_new_run_into_entry() {
        let entry = new_run()
            .into_entry("r1".into(), "2024-05-01".into())
            .unwrap();
        assert_eq!(entry.id, "r1");
        assert_eq!(entry.date, "2024-05-01");
        assert_eq!(entry.heart_rate, None);
    }

    #[test]
    fn test_patch_preserves_absent_fields() {
        let mut entry = new_run()
            .into_entry("r1".into(), "2024-05-01".into())
            .unwrap();
        entry.heart_rate = Some(150);

        let patch: RunPatch = serde_json::from_value(serde_json::json!({
            "distance": 6.2,
            "notes": "windy"
        }))
        .unwrap();
        patch.validate().unwrap();
        patch.apply_to(&mut entry);

        assert_eq!(entry.distance, 6.2);
        assert_eq!(entry.notes, "windy");
        assert_eq!(entry.pace, "5:15");
        assert_eq!(entry.heart_rate, Some(150));
    }

    #[test]
    fn test_short_duration_is_normalized() {
        let mut run = new_run();
        run.duration = "26:15".to_string();
        let entry = run.into_entry("r1".into(), "2024-05-01".into()).unwrap();
        assert_eq!(entry.duration, "0:26:15");

        let patch: RunPatch =
            serde_json::from_value(serde_json::json!({ "duration": "31:40" })).unwrap();
        patch.validate().unwrap();
        let mut entry = entry;
        patch.apply_to(&mut entry);
        assert_eq!(entry.duration, "0:31:40");
    }

    #[test]
    fn test_patch_null_heart_rate_clears_it() {
        let mut entry = new_run()
            .into_entry("r1".into(), "2024-05-01".into())
            .unwrap();
        entry.heart_rate = Some(150);

        let patch: RunPatch =
            serde_json::from_value(serde_json::json!({ "heartRate": null })).unwrap();
        patch.apply_to(&mut entry);

        assert_eq!(entry.heart_rate, None);
    }
}
