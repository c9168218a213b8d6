//! Migrate command - Relational schema management.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::{Config, StorageKind};
use crate::errors::AppResult;
use crate::infra::Database;

/// Execute the migrate command against `DATABASE_URL`
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let kind = config.storage_kind();
    if kind != StorageKind::Relational {
        tracing::warn!(storage = %kind, "Active storage is not postgres; migrating DATABASE_URL anyway");
    }

    // Connect without auto-running migrations for manual control
    let db = Database::connect_without_migrations(&config).await?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            tracing::info!("Migrations applied");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            tracing::info!("Last migration rolled back");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            let width = status.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, applied) in status {
                let state = if applied { "applied" } else { "pending" };
                println!("{:<width$}  {}", name, state, width = width);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables and re-running every migration");
            db.fresh_migrations().await?;
            tracing::info!("Schema rebuilt");
        }
    }

    Ok(())
}
