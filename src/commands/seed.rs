//! Seed command - Copies the bundled showcase projects into Firestore.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::DocumentStore;
use crate::services::{InsightsService, PortfolioInsights, ShowcaseCatalog};

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    if !config.firebase.enabled() {
        return Err(AppError::bad_request(
            "Firebase is not configured; set FIREBASE_PROJECT_ID or FIREBASE_SERVICE_ACCOUNT_KEY",
        ));
    }

    let store = Arc::new(DocumentStore::from_config(&config.firebase)?);
    let insights = PortfolioInsights::new(Arc::new(ShowcaseCatalog::bundled()?), Some(store));

    let count = insights.seed().await?;
    tracing::info!(count, "Seeded showcase projects to Firestore");
    println!("Seeded {} projects to Firebase", count);

    Ok(())
}
