//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and the approval workflow rules shared by every
//! storage backend. Nothing here touches a database or HTTP.

pub mod approval;
pub mod client;
pub mod dates;
pub mod notification;
pub mod project;
pub mod showcase;
pub mod stats;
pub mod time_entry;
pub mod time_off;
pub mod user;

pub use approval::{Approval, Decision};
pub use client::{Client, ClientChanges, NewClient};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use project::{NewProject, Project, ProjectChanges};
pub use showcase::{
    IndustryBenchmark, IndustryStats, Level, NewShowcaseProject, ProjectPhase, ShowcaseProject,
    ShowcaseStatus,
};
pub use stats::{StatsWindow, UserStats};
pub use time_entry::{
    DurationInput, NewTimeEntry, TimeEntry, TimeEntryChanges, TimeEntryStatus,
};
pub use time_off::{
    NewTimeOffRequest, TimeOffChanges, TimeOffRequest, TimeOffStatus, TimeOffType,
};
pub use user::{UpsertUser, User, UserRole};
