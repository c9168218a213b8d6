//! Application services layer - Use cases and business logic.
//!
//! Time-tracking handlers talk to `Storage` directly; the showcase portfolio
//! has its own service because it mixes a bundled catalog with the document
//! store and reports which one answered.

mod insights;

pub use insights::{
    DataSource, InsightsService, ManualProjectCreated, PortfolioInsights, PortfolioSnapshot,
    ShowcaseCatalog, Sourced,
};

#[cfg(any(test, feature = "test-utils"))]
pub use insights::MockInsightsService;
