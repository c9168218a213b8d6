//! Time-off request entity and its approval workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::approval::{Approval, Decision};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeOffType {
    Vacation,
    Sick,
    Personal,
    Holiday,
}

impl TimeOffType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOffType::Vacation => "vacation",
            TimeOffType::Sick => "sick",
            TimeOffType::Personal => "personal",
            TimeOffType::Holiday => "holiday",
        }
    }
}

impl From<&str> for TimeOffType {
    fn from(s: &str) -> Self {
        match s {
            "sick" => TimeOffType::Sick,
            "personal" => TimeOffType::Personal,
            "holiday" => TimeOffType::Holiday,
            _ => TimeOffType::Vacation,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeOffStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl TimeOffStatus {
    pub const ALL: [TimeOffStatus; 3] = [
        TimeOffStatus::Pending,
        TimeOffStatus::Approved,
        TimeOffStatus::Rejected,
    ];

    /// Pending requests get decided once; a decision may be repeated.
    pub fn can_become(self, next: TimeOffStatus) -> bool {
        match (self, next) {
            (TimeOffStatus::Pending, TimeOffStatus::Pending) => false,
            (TimeOffStatus::Pending, _) => true,
            (current, next) => current == next,
        }
    }

    pub fn sources_for(next: TimeOffStatus) -> Vec<TimeOffStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| s.can_become(next))
            .collect()
    }

    pub fn from_decision(decision: Decision) -> Self {
        match decision {
            Decision::Approve => TimeOffStatus::Approved,
            Decision::Reject => TimeOffStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOffStatus::Pending => "pending",
            TimeOffStatus::Approved => "approved",
            TimeOffStatus::Rejected => "rejected",
        }
    }
}

impl From<&str> for TimeOffStatus {
    fn from(s: &str) -> Self {
        match s {
            "approved" => TimeOffStatus::Approved,
            "rejected" => TimeOffStatus::Rejected,
            _ => TimeOffStatus::Pending,
        }
    }
}

impl std::fmt::Display for TimeOffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn ensure_time_off_transition(current: TimeOffStatus, next: TimeOffStatus) -> AppResult<()> {
    if current.can_become(next) {
        Ok(())
    } else {
        Err(AppError::invalid_state(format!(
            "Time-off request is {} and cannot become {}",
            current, next
        )))
    }
}

/// Request for leave over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffRequest {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TimeOffType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: Option<String>,
    #[serde(default)]
    pub status: TimeOffStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeOffRequest {
    pub fn new(id: String, data: NewTimeOffRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: data.user_id,
            kind: data.kind,
            start_date: data.start_date,
            end_date: data.end_date,
            reason: data.reason,
            status: TimeOffStatus::Pending,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Edit the request itself; approval fields change only through `decide`
    pub fn apply(&mut self, changes: TimeOffChanges, now: DateTime<Utc>) -> AppResult<()> {
        let start_date = changes.start_date.unwrap_or(self.start_date);
        let end_date = changes.end_date.unwrap_or(self.end_date);
        ensure_range(start_date, end_date)?;

        if let Some(kind) = changes.kind {
            self.kind = kind;
        }
        if let Some(reason) = changes.reason {
            self.reason = Some(reason);
        }
        self.start_date = start_date;
        self.end_date = end_date;
        self.updated_at = now;
        Ok(())
    }

    pub fn decide(&mut self, decision: Decision, approval: &Approval) -> AppResult<()> {
        let next = TimeOffStatus::from_decision(decision);
        ensure_time_off_transition(self.status, next)?;
        self.status = next;
        self.approved_by = Some(approval.approver_id.clone());
        self.approved_at = Some(approval.decided_at);
        self.updated_at = approval.decided_at;
        Ok(())
    }
}

/// Validated time-off creation data
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeOffRequest {
    pub user_id: String,
    pub kind: TimeOffType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: Option<String>,
}

impl NewTimeOffRequest {
    pub fn ensure_valid_range(&self) -> AppResult<()> {
        ensure_range(self.start_date, self.end_date)
    }
}

/// Partial time-off edit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeOffChanges {
    pub kind: Option<TimeOffType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

fn ensure_range(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if end < start {
        return Err(AppError::validation("End date must not precede start date"));
    }
    Ok(())
}
