//! Approval decisions shared by time entries and time-off requests.

use chrono::{DateTime, Utc};

/// Outcome a reviewer can record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn verb(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

/// Reviewer and moment of a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub approver_id: String,
    pub decided_at: DateTime<Utc>,
}

impl Approval {
    pub fn now(approver_id: impl Into<String>) -> Self {
        Self {
            approver_id: approver_id.into(),
            decided_at: Utc::now(),
        }
    }
}
