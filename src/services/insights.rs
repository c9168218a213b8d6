//! Showcase insights service - Portfolio data for the analytics dashboard.
//!
//! Reads prefer the document store and degrade to the bundled catalog when
//! it fails. The outcome says which source answered, so handlers can report
//! it instead of hiding the fallback.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::analytics::{portfolio_overview, summarize, PortfolioOverview, ProjectAnalytics};
use crate::config::MANUAL_PROJECT_ID_PREFIX;
use crate::domain::{IndustryStats, NewShowcaseProject, ShowcaseProject};
use crate::errors::{AppError, AppResult};
use crate::infra::storage::ShowcaseStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const BUNDLED_PROJECTS: &str = include_str!("../../data/showcase_projects.json");
const BUNDLED_INDUSTRY_STATS: &str = include_str!("../../data/industry_stats.json");

/// Where a showcase answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Primary,
    Fallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Primary => "primary",
            DataSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Sourced<T> {
    pub fn primary(data: T) -> Self {
        Self { data, source: DataSource::Primary }
    }

    pub fn fallback(data: T) -> Self {
        Self { data, source: DataSource::Fallback }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            data: f(self.data),
            source: self.source,
        }
    }
}

/// Real-data payload: projects, benchmarks and status counts
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub projects: Vec<ShowcaseProject>,
    /// Benchmarks keyed by industry
    #[schema(value_type = Object)]
    pub stats: IndustryStats,
    pub summary: PortfolioOverview,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualProjectCreated {
    pub success: bool,
    pub project: ShowcaseProject,
    pub total_projects: usize,
}

/// In-process showcase dataset.
///
/// Starts from the bundled JSON and grows with manual additions made while
/// no document store is configured.
pub struct ShowcaseCatalog {
    projects: RwLock<Vec<ShowcaseProject>>,
    industry_stats: IndustryStats,
}

impl ShowcaseCatalog {
    pub fn new(projects: Vec<ShowcaseProject>, industry_stats: IndustryStats) -> Self {
        Self {
            projects: RwLock::new(projects),
            industry_stats,
        }
    }

    /// Catalog built from the dataset compiled into the binary
    pub fn bundled() -> AppResult<Self> {
        let projects = serde_json::from_str(BUNDLED_PROJECTS)
            .map_err(|e| AppError::internal(format!("Invalid bundled projects: {}", e)))?;
        let industry_stats = serde_json::from_str(BUNDLED_INDUSTRY_STATS)
            .map_err(|e| AppError::internal(format!("Invalid bundled industry stats: {}", e)))?;
        Ok(Self::new(projects, industry_stats))
    }

    pub async fn snapshot(&self) -> Vec<ShowcaseProject> {
        self.projects.read().await.clone()
    }

    /// Append a project and return the new catalog size
    pub async fn push(&self, project: ShowcaseProject) -> usize {
        let mut projects = self.projects.write().await;
        projects.push(project);
        projects.len()
    }

    pub fn industry_stats(&self) -> &IndustryStats {
        &self.industry_stats
    }
}

/// Showcase service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait InsightsService: Send + Sync {
    /// All showcase projects, tagged with the source that answered
    async fn projects(&self) -> Sourced<Vec<ShowcaseProject>>;

    /// Aggregated portfolio figures
    async fn analytics(&self) -> Sourced<ProjectAnalytics>;

    /// Projects with industry benchmarks and status counts
    async fn overview(&self) -> Sourced<PortfolioSnapshot>;

    /// Record a project entered through the manual form
    async fn add_manual(&self, data: NewShowcaseProject) -> AppResult<ManualProjectCreated>;

    /// Push the catalog into the document store, returning how many were written
    async fn seed(&self) -> AppResult<usize>;
}

/// Concrete implementation of InsightsService over the catalog and an
/// optional document store.
pub struct PortfolioInsights {
    catalog: Arc<ShowcaseCatalog>,
    store: Option<Arc<dyn ShowcaseStore>>,
}

impl PortfolioInsights {
    pub fn new(catalog: Arc<ShowcaseCatalog>, store: Option<Arc<dyn ShowcaseStore>>) -> Self {
        Self { catalog, store }
    }
}

fn manual_project_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}{}", MANUAL_PROJECT_ID_PREFIX, hex[..8].to_uppercase())
}

#[async_trait]
impl InsightsService for PortfolioInsights {
    async fn projects(&self) -> Sourced<Vec<ShowcaseProject>> {
        let Some(store) = &self.store else {
            return Sourced::primary(self.catalog.snapshot().await);
        };

        match store.list_showcase_projects().await {
            Ok(projects) => Sourced::primary(projects),
            Err(e) => {
                tracing::warn!(error = %e, "Showcase read failed, serving bundled projects");
                Sourced::fallback(self.catalog.snapshot().await)
            }
        }
    }

    async fn analytics(&self) -> Sourced<ProjectAnalytics> {
        let Some(store) = &self.store else {
            return Sourced::primary(summarize(&self.catalog.snapshot().await));
        };

        match store.get_analytics().await {
            Ok(analytics) => Sourced::primary(analytics),
            Err(e) => {
                tracing::warn!(error = %e, "Showcase analytics failed, using bundled projects");
                Sourced::fallback(summarize(&self.catalog.snapshot().await))
            }
        }
    }

    async fn overview(&self) -> Sourced<PortfolioSnapshot> {
        let stats = self.catalog.industry_stats().clone();
        self.projects().await.map(|projects| PortfolioSnapshot {
            summary: portfolio_overview(&projects),
            projects,
            stats,
        })
    }

    async fn add_manual(&self, data: NewShowcaseProject) -> AppResult<ManualProjectCreated> {
        data.validate()?;
        data.ensure_schedule()?;

        let project = ShowcaseProject::from_manual(manual_project_id(), data);

        let total_projects = match &self.store {
            Some(store) => {
                store.add_showcase_project(project.clone()).await?;
                store.list_showcase_projects().await?.len()
            }
            None => self.catalog.push(project.clone()).await,
        };

        tracing::info!(project_id = %project.id, total_projects, "Manual showcase project added");

        Ok(ManualProjectCreated {
            success: true,
            project,
            total_projects,
        })
    }

    async fn seed(&self) -> AppResult<usize> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| AppError::bad_request("Firebase is not configured"))?;

        store.seed_showcase_projects(self.catalog.snapshot().await).await
    }
}
