// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Weight log records, stored one document each under `weightFolder`.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::time_utils::parse_calendar_date;

/// A single body-weight measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeightRecord {
    #[serde(alias = "_firestore_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    pub weight: f64,
}

/// Weight record as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewWeight {
    pub date: String,
    pub weight: Option<f64>,
}

impl NewWeight {
    pub fn into_record(self, id: String) -> Result<WeightRecord> {
        let invalid = || AppError::Validation("Please provide valid weight and date.".to_string());

        let weight = self
            .weight
            .filter(|w| w.is_finite() && *w > 0.0)
            .ok_or_else(invalid)?;
        let date = parse_calendar_date(&self.date).ok_or_else(invalid)?;

        Ok(WeightRecord {
            id,
            date: date.format(crate::time_utils::DATE_FORMAT).to_string(),
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_record_normalizes_date() {
        let record = NewWeight {
            date: " 2024-09-10 ".to_string(),
            weight: Some(185.0),
        }
        .into_record("w1".to_string())
        .unwrap();
        assert_eq!(record.date, "2024-09-10");
        assert_eq!(record.weight, 185.0);
    }

    #[test]
    fn test_into_record_rejects_missing_or_invalid() {
        assert!(NewWeight {
            date: "2024-09-10".to_string(),
            weight: None
        }
        .into_record("w".to_string())
        .is_err());
        assert!(NewWeight {
            date: "".to_string(),
            weight: Some(180.0)
        }
        .into_record("w".to_string())
        .is_err());
        assert!(NewWeight {
            date: "2024-09-10".to_string(),
            weight: Some(f64::NAN)
        }
        .into_record("w".to_string())
        .is_err());
    }
}
