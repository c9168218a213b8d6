//! Project domain entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::config::DEFAULT_PROJECT_COLOR;

/// Billable project, optionally owned by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Owning client; projects may be clientless
    pub client_id: Option<String>,
    pub color: String,
    #[schema(value_type = Option<String>, example = "12500.00")]
    pub budget: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "95.00")]
    pub hourly_rate: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: String, data: NewProject, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: data.name,
            description: data.description,
            client_id: data.client_id,
            color: data.color.unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
            budget: data.budget,
            hourly_rate: data.hourly_rate,
            is_active: data.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: ProjectChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(client_id) = changes.client_id {
            self.client_id = Some(client_id);
        }
        if let Some(color) = changes.color {
            self.color = color;
        }
        if let Some(budget) = changes.budget {
            self.budget = Some(budget);
        }
        if let Some(rate) = changes.hourly_rate {
            self.hourly_rate = Some(rate);
        }
        if let Some(active) = changes.is_active {
            self.is_active = active;
        }
        self.updated_at = now;
    }
}

/// Project creation data
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub client_id: Option<String>,
    pub color: Option<String>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub budget: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub hourly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Partial project update
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectChanges {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<String>,
    pub color: Option<String>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub budget: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub hourly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Money amounts can never be negative
fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("Amounts must not be negative".into());
        return Err(error);
    }
    Ok(())
}
