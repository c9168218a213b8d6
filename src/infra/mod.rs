//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - The storage backends behind the `Storage` trait
//! - The Firestore REST client

pub mod db;
pub mod storage;

pub use db::{Database, Migrator};
pub use storage::{
    DocumentStore, MemoryStore, RelationalStore, ShowcaseStore, Storage, StorageBackend,
};

#[cfg(any(test, feature = "test-utils"))]
pub use storage::{MockShowcaseStore, MockStorage};
