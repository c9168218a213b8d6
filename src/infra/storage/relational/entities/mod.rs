//! SeaORM entity definitions, one module per table.

pub mod client;
pub mod notification;
pub mod project;
pub mod time_entry;
pub mod time_off_request;
pub mod user;
