//! Portfolio analytics.
//!
//! Pure aggregation over showcase projects. Every figure is computed from the
//! records as given; nothing is smoothed or estimated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{BUDGET_LABEL_CHARS, MILLIS_PER_DAY, TIMELINE_LABEL_CHARS};
use crate::domain::{ShowcaseProject, ShowcaseStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPoint {
    pub name: String,
    pub estimated: f64,
    pub actual: f64,
    /// Percent of the budget spent
    pub efficiency: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub name: String,
    /// Days
    pub duration: i64,
    pub progress: u32,
    pub industry: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_budget: f64,
    pub total_actual_cost: f64,
    pub avg_team_size: i64,
    pub avg_progress: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalytics {
    pub industry_breakdown: BTreeMap<String, usize>,
    pub budget_analysis: Vec<BudgetPoint>,
    pub timeline_data: Vec<TimelinePoint>,
    pub summary: PortfolioSummary,
}

/// Project counts by lifecycle stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PortfolioOverview {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub testing: usize,
    pub planning: usize,
}

pub fn summarize(projects: &[ShowcaseProject]) -> ProjectAnalytics {
    let mut industry_breakdown = BTreeMap::new();
    for project in projects {
        *industry_breakdown
            .entry(project.industry.clone())
            .or_insert(0usize) += 1;
    }

    let budget_analysis = projects
        .iter()
        .map(|p| BudgetPoint {
            name: format!("{}...", truncate_chars(&p.name, BUDGET_LABEL_CHARS)),
            estimated: p.budget,
            actual: p.actual_cost,
            efficiency: efficiency(p.actual_cost, p.budget),
        })
        .collect();

    let timeline_data = projects
        .iter()
        .map(|p| TimelinePoint {
            name: truncate_chars(&p.name, TIMELINE_LABEL_CHARS).to_string(),
            duration: duration_days(p),
            progress: p.progress,
            industry: p.industry.clone(),
        })
        .collect();

    ProjectAnalytics {
        industry_breakdown,
        budget_analysis,
        timeline_data,
        summary: portfolio_summary(projects),
    }
}

pub fn portfolio_overview(projects: &[ShowcaseProject]) -> PortfolioOverview {
    let count = |status: ShowcaseStatus| projects.iter().filter(|p| p.status == status).count();

    PortfolioOverview {
        total: projects.len(),
        active: count(ShowcaseStatus::InProgress),
        completed: count(ShowcaseStatus::Completed),
        testing: count(ShowcaseStatus::Testing),
        planning: count(ShowcaseStatus::Planning),
    }
}

fn portfolio_summary(projects: &[ShowcaseProject]) -> PortfolioSummary {
    if projects.is_empty() {
        return PortfolioSummary::default();
    }

    let n = projects.len() as f64;
    let team: u64 = projects.iter().map(|p| u64::from(p.team_size)).sum();
    let progress: u64 = projects.iter().map(|p| u64::from(p.progress)).sum();

    PortfolioSummary {
        total_budget: projects.iter().map(|p| p.budget).sum(),
        total_actual_cost: projects.iter().map(|p| p.actual_cost).sum(),
        avg_team_size: (team as f64 / n).round() as i64,
        avg_progress: (progress as f64 / n).round() as i64,
    }
}

/// Spent share of the budget in whole percent; zero for an unbudgeted project.
fn efficiency(actual: f64, budget: f64) -> i64 {
    if budget == 0.0 {
        return 0;
    }
    (actual / budget * 100.0).round() as i64
}

/// Calendar span in days, partial days counted as whole.
fn duration_days(project: &ShowcaseProject) -> i64 {
    let millis = (project.end_date - project.start_date).num_milliseconds();
    // integer ceiling that also holds for inverted ranges
    -((-millis).div_euclid(MILLIS_PER_DAY))
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
