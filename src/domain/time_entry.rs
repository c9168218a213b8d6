//! Time entry entity, approval workflow and duration parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::approval::{Approval, Decision};
use crate::config::MINUTES_PER_HOUR;
use crate::errors::{AppError, AppResult};

/// Approval workflow state of a time entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeEntryStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl TimeEntryStatus {
    pub const ALL: [TimeEntryStatus; 4] = [
        TimeEntryStatus::Draft,
        TimeEntryStatus::Submitted,
        TimeEntryStatus::Approved,
        TimeEntryStatus::Rejected,
    ];

    fn rank(self) -> u8 {
        match self {
            TimeEntryStatus::Draft => 0,
            TimeEntryStatus::Submitted => 1,
            TimeEntryStatus::Approved | TimeEntryStatus::Rejected => 2,
        }
    }

    /// Approved and rejected are terminal
    pub fn is_decided(self) -> bool {
        self.rank() == 2
    }

    /// Moves are forward-only; a decision may be repeated but not reversed.
    pub fn can_become(self, next: TimeEntryStatus) -> bool {
        next.rank() > self.rank() || (next == self && next.is_decided())
    }

    /// Every status from which `next` is reachable.
    pub fn sources_for(next: TimeEntryStatus) -> Vec<TimeEntryStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| s.can_become(next))
            .collect()
    }

    pub fn from_decision(decision: Decision) -> Self {
        match decision {
            Decision::Approve => TimeEntryStatus::Approved,
            Decision::Reject => TimeEntryStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeEntryStatus::Draft => "draft",
            TimeEntryStatus::Submitted => "submitted",
            TimeEntryStatus::Approved => "approved",
            TimeEntryStatus::Rejected => "rejected",
        }
    }
}

impl From<&str> for TimeEntryStatus {
    fn from(s: &str) -> Self {
        match s {
            "submitted" => TimeEntryStatus::Submitted,
            "approved" => TimeEntryStatus::Approved,
            "rejected" => TimeEntryStatus::Rejected,
            _ => TimeEntryStatus::Draft,
        }
    }
}

impl std::fmt::Display for TimeEntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fail with a conflict unless `current -> next` is allowed.
pub fn ensure_entry_transition(current: TimeEntryStatus, next: TimeEntryStatus) -> AppResult<()> {
    if current.can_become(next) {
        Ok(())
    } else {
        Err(AppError::invalid_state(format!(
            "Time entry is {} and cannot become {}",
            current, next
        )))
    }
}

/// Time spent by a user on a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes
    pub duration: Option<i32>,
    pub date: DateTime<Utc>,
    pub is_billable: bool,
    #[serde(default)]
    pub status: TimeEntryStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn new(id: String, data: NewTimeEntry, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: data.user_id,
            project_id: data.project_id,
            description: data.description,
            start_time: data.start_time,
            end_time: data.end_time,
            duration: data.duration,
            date: data.date,
            is_billable: data.is_billable,
            status: data.status,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: TimeEntryChanges, now: DateTime<Utc>) {
        if let Some(project_id) = changes.project_id {
            self.project_id = project_id;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(start) = changes.start_time {
            self.start_time = Some(start);
        }
        if let Some(end) = changes.end_time {
            self.end_time = Some(end);
        }
        if let Some(duration) = changes.duration {
            self.duration = Some(duration);
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(billable) = changes.is_billable {
            self.is_billable = billable;
        }
        self.updated_at = now;
    }

    /// Hand the entry in for review
    pub fn submit(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        ensure_entry_transition(self.status, TimeEntryStatus::Submitted)?;
        self.status = TimeEntryStatus::Submitted;
        self.updated_at = now;
        Ok(())
    }

    /// Record a reviewer's decision; approver fields change only here
    pub fn decide(&mut self, decision: Decision, approval: &Approval) -> AppResult<()> {
        let next = TimeEntryStatus::from_decision(decision);
        ensure_entry_transition(self.status, next)?;
        self.status = next;
        self.approved_by = Some(approval.approver_id.clone());
        self.approved_at = Some(approval.decided_at);
        self.updated_at = approval.decided_at;
        Ok(())
    }
}

/// Validated time entry creation data
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeEntry {
    pub user_id: String,
    pub project_id: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub date: DateTime<Utc>,
    pub is_billable: bool,
    pub status: TimeEntryStatus,
}

/// Partial time entry update; status moves go through the workflow operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeEntryChanges {
    pub project_id: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub date: Option<DateTime<Utc>>,
    pub is_billable: Option<bool>,
}

/// Duration as typed by a user: whole minutes or `H:MM`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Minutes(i32),
    Clock(String),
}

impl DurationInput {
    pub fn to_minutes(&self) -> AppResult<i32> {
        match self {
            DurationInput::Minutes(m) if *m >= 0 => Ok(*m),
            DurationInput::Minutes(_) => Err(AppError::validation("Duration must not be negative")),
            DurationInput::Clock(raw) => parse_clock_duration(raw),
        }
    }
}

/// Convert `H:MM` into minutes (`hours * 60 + minutes`).
pub fn parse_clock_duration(raw: &str) -> AppResult<i32> {
    let invalid = || AppError::validation("Duration must be in HH:MM format");

    let (hours, minutes) = raw.trim().split_once(':').ok_or_else(invalid)?;
    if hours.is_empty()
        || minutes.len() != 2
        || !hours.bytes().all(|b| b.is_ascii_digit())
        || !minutes.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= MINUTES_PER_HOUR {
        return Err(AppError::validation("Minutes must be below 60"));
    }

    i32::try_from(hours * MINUTES_PER_HOUR + minutes).map_err(|_| invalid())
}

/// Whole minutes between two instants, `None` when `end` precedes `start`.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<i32> {
    let minutes = (end - start).num_minutes();
    if minutes < 0 {
        return None;
    }
    i32::try_from(minutes).ok()
}

/// Pick the stored duration: explicit input wins, else the start/end span.
pub fn resolve_duration(
    duration: Option<&DurationInput>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> AppResult<Option<i32>> {
    if let Some(input) = duration {
        return input.to_minutes().map(Some);
    }

    match (start, end) {
        (Some(start), Some(end)) => minutes_between(start, end)
            .map(Some)
            .ok_or_else(|| AppError::validation("End time must not precede start time")),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: TimeEntryStatus) -> TimeEntry {
        let now = Utc::now();
        TimeEntry {
            id: "te1".into(),
            user_id: "u1".into(),
            project_id: "p1".into(),
            description: None,
            start_time: None,
            end_time: None,
            duration: Some(60),
            date: now,
            is_billable: true,
            status,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_clock_duration_parsing() {
        assert_eq!(parse_clock_duration("1:30").unwrap(), 90);
        assert_eq!(parse_clock_duration("08:05").unwrap(), 485);
        assert_eq!(parse_clock_duration("0:00").unwrap(), 0);
        assert!(parse_clock_duration("1:60").is_err());
        assert!(parse_clock_duration("1:5").is_err());
        assert!(parse_clock_duration("90").is_err());
        assert!(parse_clock_duration("-1:30").is_err());
    }

    #[test]
    fn test_duration_falls_back_to_span() {
        let start = Utc::now();
        let end = start + chrono::Duration::minutes(45);
        assert_eq!(resolve_duration(None, Some(start), Some(end)).unwrap(), Some(45));
        assert!(resolve_duration(None, Some(end), Some(start)).is_err());

        let typed = DurationInput::Clock("2:15".into());
        assert_eq!(
            resolve_duration(Some(&typed), Some(start), Some(end)).unwrap(),
            Some(135)
        );
    }

    #[test]
    fn test_forward_only_transitions() {
        use TimeEntryStatus::*;
        assert!(Draft.can_become(Submitted));
        assert!(Draft.can_become(Approved));
        assert!(Submitted.can_become(Rejected));
        assert!(Approved.can_become(Approved));
        assert!(!Approved.can_become(Rejected));
        assert!(!Submitted.can_become(Draft));
        assert!(!Submitted.can_become(Submitted));
        assert_eq!(TimeEntryStatus::sources_for(Approved), vec![Draft, Submitted, Approved]);
    }

    #[test]
    fn test_repeat_approval_refreshes_timestamp() {
        let mut te = entry(TimeEntryStatus::Submitted);
        let first = Approval::now("m1");
        te.decide(Decision::Approve, &first).unwrap();
        assert_eq!(te.status, TimeEntryStatus::Approved);
        assert_eq!(te.approved_by.as_deref(), Some("m1"));

        let second = Approval {
            approver_id: "m2".into(),
            decided_at: first.decided_at + chrono::Duration::seconds(5),
        };
        te.decide(Decision::Approve, &second).unwrap();
        assert_eq!(te.status, TimeEntryStatus::Approved);
        assert_eq!(te.approved_at, Some(second.decided_at));

        let err = te.decide(Decision::Reject, &second).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_submit_leaves_approval_fields_empty() {
        let mut te = entry(TimeEntryStatus::Draft);
        te.submit(Utc::now()).unwrap();
        assert_eq!(te.status, TimeEntryStatus::Submitted);
        assert!(te.approved_by.is_none());
        assert!(te.approved_at.is_none());
        assert!(te.submit(Utc::now()).is_err());
    }
}
