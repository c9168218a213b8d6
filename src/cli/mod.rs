//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Relational schema migrations
//! - `seed` - Copy the showcase projects into Firestore

pub mod args;

pub use args::{Cli, Commands};
