// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date grouping for display: newest calendar date first.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Exercise, LiftDay, RunEntry, WeightRecord};
use crate::time_utils::parse_calendar_date;

/// Something stored with a calendar date.
pub trait Dated {
    type Item;

    fn date(&self) -> &str;

    /// The display items this entry contributes to its date's group.
    fn into_items(self) -> Vec<Self::Item>;
}

impl Dated for RunEntry {
    type Item = RunEntry;

    fn date(&self) -> &str {
        &self.date
    }

    fn into_items(self) -> Vec<RunEntry> {
        vec![self]
    }
}

impl Dated for LiftDay {
    type Item = Exercise;

    fn date(&self) -> &str {
        &self.date
    }

    fn into_items(self) -> Vec<Exercise> {
        self.exercises
    }
}

impl Dated for WeightRecord {
    type Item = WeightRecord;

    fn date(&self) -> &str {
        &self.date
    }

    fn into_items(self) -> Vec<WeightRecord> {
        vec![self]
    }
}

/// All items sharing one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateGroup<T> {
    pub date: String,
    pub items: Vec<T>,
}

/// Group entries by date, newest first.
///
/// Items keep their original order within a date. Dates that do not parse
/// as `YYYY-MM-DD` sort after every valid date, in first-seen order.
pub fn group_by_date<E: Dated>(entries: impl IntoIterator<Item = E>) -> Vec<DateGroup<E::Item>> {
    let mut groups: Vec<(Option<NaiveDate>, DateGroup<E::Item>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let date = entry.date().to_string();
        let slot = match index.get(&date) {
            Some(&i) => i,
            None => {
                groups.push((
                    parse_calendar_date(&date),
                    DateGroup {
                        date: date.clone(),
                        items: Vec::new(),
                    },
                ));
                index.insert(date, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].1.items.extend(entry.into_items());
    }

    // Stable sort keeps first-seen order among equal keys.
    groups.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    groups.into_iter().map(|(_, group)| group).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(id: &str, date: &str) -> WeightRecord {
        WeightRecord {
            id: id.to_string(),
            date: date.to_string(),
            weight: 180.0,
        }
    }

    fn ids(group: &DateGroup<WeightRecord>) -> Vec<&str> {
        group.items.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn test_newest_first_with_original_order() {
        let groups = group_by_date(vec![
            weight("a", "2024-01-01"),
            weight("b", "2024-01-02"),
            weight("c", "2024-01-01"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, "2024-01-02");
        assert_eq!(groups[1].date, "2024-01-01");
        assert_eq!(ids(&groups[1]), vec!["a", "c"]);
    }

    #[test]
    fn test_calendar_order_not_string_order() {
        let groups = group_by_date(vec![
            weight("a", "2023-12-31"),
            weight("b", "2024-02-01"),
            weight("c", "2024-01-15"),
        ]);
        let dates: Vec<&str> = groups.iter().map(|g| g.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-01", "2024-01-15", "2023-12-31"]);
    }

    #[test]
    fn test_unparsable_dates_last() {
        let groups = group_by_date(vec![
            weight("a", "someday"),
            weight("b", "2024-01-01"),
            weight("c", ""),
            weight("d", "someday"),
        ]);
        let dates: Vec<&str> = groups.iter().map(|g| g.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "someday", ""]);
        assert_eq!(ids(&groups[1]), vec!["a", "d"]);
    }

    #[test]
    fn test_lift_days_flatten_into_exercises() {
        let day = |date: &str, names: &[&str]| LiftDay {
            date: date.to_string(),
            exercises: names
                .iter()
                .map(|n| Exercise {
                    name: n.to_string(),
                    ..Exercise::default()
                })
                .collect(),
        };
        let groups = group_by_date(vec![
            day("2024-03-01", &["Squat"]),
            day("2024-03-02", &["Bench"]),
            day("2024-03-01", &["Deadlift", "Row"]),
        ]);
        let names: Vec<&str> = groups[1].items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Squat", "Deadlift", "Row"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_date(Vec::<RunEntry>::new()).is_empty());
    }
}
