//! Showcase portfolio records.
//!
//! A denormalised, read-mostly project shape used by the analytics
//! dashboard. It is not part of the time-tracking model: records are either
//! bundled demo data or added through the manual project form.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::MANUAL_ACTUAL_COST_RATIO;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ShowcaseStatus {
    Planning,
    InProgress,
    Testing,
    Completed,
    OnHold,
}

/// Shared scale for priority and risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPhase {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowcaseProject {
    #[schema(example = "CONST_001")]
    pub id: String,
    pub name: String,
    #[schema(example = "Construction")]
    pub industry: String,
    pub domain: String,
    pub client: String,
    pub status: ShowcaseStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub actual_cost: f64,
    pub team_size: u32,
    /// Percent complete, 0–100
    pub progress: u32,
    pub priority: Level,
    pub risk_level: Level,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub phases: Vec<ProjectPhase>,
}

impl ShowcaseProject {
    /// Build a record from the manual form, booking 80 % of the budget as spent.
    pub fn from_manual(id: String, data: NewShowcaseProject) -> Self {
        Self {
            id,
            actual_cost: data.budget * MANUAL_ACTUAL_COST_RATIO,
            name: data.name,
            industry: data.industry,
            domain: data.domain.unwrap_or_default(),
            client: data.client,
            status: data.status,
            start_date: data.start_date,
            end_date: data.end_date,
            budget: data.budget,
            team_size: data.team_size,
            progress: data.progress.unwrap_or(0),
            priority: data.priority,
            risk_level: data.risk_level,
            location: data.location.unwrap_or_default(),
            description: data.description,
            technologies: data.technologies.unwrap_or_default(),
            phases: Vec::new(),
        }
    }
}

/// Manual project form payload
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewShowcaseProject {
    #[validate(length(min = 2, message = "Project name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Please select an industry"))]
    pub industry: String,
    pub domain: Option<String>,
    #[validate(length(min = 1, message = "Client name is required"))]
    pub client: String,
    pub status: ShowcaseStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 0.0, message = "Budget must not be negative"))]
    pub budget: f64,
    #[validate(range(min = 1, message = "Team size must be at least 1"))]
    pub team_size: u32,
    #[validate(range(max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<u32>,
    pub priority: Level,
    pub risk_level: Level,
    pub location: Option<String>,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    pub technologies: Option<Vec<String>>,
}

impl NewShowcaseProject {
    pub fn ensure_schedule(&self) -> AppResult<()> {
        if self.end_date < self.start_date {
            return Err(AppError::validation("End date must not precede start date"));
        }
        Ok(())
    }
}

/// Published benchmark figures for one industry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndustryBenchmark {
    pub total_projects: u64,
    pub avg_budget: f64,
    /// Days
    pub avg_duration: u32,
}

pub type IndustryStats = BTreeMap<String, IndustryBenchmark>;

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> NewShowcaseProject {
        NewShowcaseProject {
            name: "Harbor Bridge Retrofit".into(),
            industry: "Construction".into(),
            domain: None,
            client: "Port Authority".into(),
            status: ShowcaseStatus::Planning,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            budget: 1_000_000.0,
            team_size: 12,
            progress: None,
            priority: Level::High,
            risk_level: Level::Medium,
            location: None,
            description: "Seismic retrofit of the harbor bridge".into(),
            technologies: None,
        }
    }

    #[test]
    fn test_manual_defaults() {
        let project = ShowcaseProject::from_manual("USER_1".into(), manual());
        assert_eq!(project.actual_cost, 800_000.0);
        assert_eq!(project.progress, 0);
        assert!(project.phases.is_empty());
        assert_eq!(project.domain, "");
    }

    #[test]
    fn test_status_uses_kebab_case() {
        let json = serde_json::to_string(&ShowcaseStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn test_manual_validation() {
        let mut data = manual();
        assert!(data.validate().is_ok());
        data.description = "short".into();
        assert!(data.validate().is_err());
    }
}
