//! Client domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A customer that owns zero or more projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    #[schema(example = "Bay Area Developers LLC")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(id: String, data: NewClient, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            address: data.address,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: ClientChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = Some(email);
        }
        if let Some(phone) = changes.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = changes.address {
            self.address = Some(address);
        }
        self.updated_at = now;
    }
}

/// Client creation data
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, message = "Client name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial client update
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientChanges {
    #[validate(length(min = 1, message = "Client name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
