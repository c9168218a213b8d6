//! Timeboard - Time tracking and project analytics API
//!
//! Tracks hours against client projects with an approval workflow, handles
//! time-off requests and serves portfolio analytics for a dashboard. Data
//! lives in Postgres, Firestore or memory, chosen at startup.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, status workflow and input parsing
//! - **analytics**: Portfolio aggregation
//! - **services**: Showcase use cases with primary/fallback sourcing
//! - **infra**: Database, migrations and the storage backends
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server on the in-memory backend
//! STORAGE_TYPE=memory cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Push showcase projects to Firestore
//! cargo run -- seed
//! ```

pub mod analytics;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use infra::{Storage, StorageBackend};
