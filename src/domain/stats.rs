//! Dashboard hour totals for a single user.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dates::{start_of_day, start_of_week};
use super::time_entry::TimeEntry;
use crate::config::MINUTES_PER_HOUR;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[schema(example = 1.5)]
    pub today_hours: f64,
    #[schema(example = 12.25)]
    pub week_hours: f64,
    /// Billable hours of the current week
    pub billable_hours: f64,
}

impl UserStats {
    pub fn from_minutes(today: i64, week: i64, billable: i64) -> Self {
        Self {
            today_hours: minutes_to_hours(today),
            week_hours: minutes_to_hours(week),
            billable_hours: minutes_to_hours(billable),
        }
    }
}

/// Minutes to hours, rounded to one decimal.
pub fn minutes_to_hours(minutes: i64) -> f64 {
    let hours = minutes as f64 / MINUTES_PER_HOUR as f64;
    (hours * 10.0).round() / 10.0
}

/// Lower bounds of "today" and "this week" in local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    pub today_start: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
}

impl StatsWindow {
    pub fn at(now: DateTime<Local>) -> Self {
        Self {
            today_start: start_of_day(now),
            week_start: start_of_week(now),
        }
    }

    pub fn current() -> Self {
        Self::at(Local::now())
    }

    /// Sum entry durations against the window boundaries.
    pub fn tally<'a, I>(&self, entries: I) -> UserStats
    where
        I: IntoIterator<Item = &'a TimeEntry>,
    {
        let (mut today, mut week, mut billable) = (0i64, 0i64, 0i64);

        for entry in entries {
            let minutes = i64::from(entry.duration.unwrap_or(0));
            if entry.date >= self.today_start {
                today += minutes;
            }
            if entry.date >= self.week_start {
                week += minutes;
                if entry.is_billable {
                    billable += minutes;
                }
            }
        }

        UserStats::from_minutes(today, week, billable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeEntryStatus;

    fn entry_at(date: DateTime<Utc>, minutes: i32, billable: bool) -> TimeEntry {
        TimeEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".into(),
            project_id: "p1".into(),
            description: None,
            start_time: None,
            end_time: None,
            duration: Some(minutes),
            date,
            is_billable: billable,
            status: TimeEntryStatus::Draft,
            approved_by: None,
            approved_at: None,
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        assert_eq!(minutes_to_hours(90), 1.5);
        assert_eq!(minutes_to_hours(100), 1.7);
        assert_eq!(minutes_to_hours(0), 0.0);
    }

    #[test]
    fn test_tally_splits_today_week_and_billable() {
        let window = StatsWindow::current();
        let now = Utc::now();
        let entries = vec![
            entry_at(now, 90, true),
            entry_at(now, 30, false),
            entry_at(window.week_start - chrono::Duration::days(2), 600, true),
        ];

        let stats = window.tally(&entries);
        assert_eq!(stats.today_hours, 2.0);
        assert!(stats.today_hours <= stats.week_hours);
        assert_eq!(stats.billable_hours, 1.5);
    }
}
