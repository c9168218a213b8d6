//! Application configuration module
//!
//! Handles environment variables, storage selection and application-wide constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::{Config, FirebaseConfig, StorageKind};
