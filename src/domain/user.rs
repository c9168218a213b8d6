//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{ROLE_ADMIN, ROLE_EMPLOYEE, ROLE_MANAGER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Employee,
    Manager,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => ROLE_EMPLOYEE,
            UserRole::Manager => ROLE_MANAGER,
            UserRole::Admin => ROLE_ADMIN,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            ROLE_MANAGER => UserRole::Manager,
            _ => UserRole::Employee,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User domain entity
///
/// Created on first login through the external identity provider and
/// updated on every later login; never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = "42031857")]
    pub id: String,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh user record from login data
    pub fn from_upsert(data: UpsertUser, now: DateTime<Utc>) -> Self {
        Self {
            id: data.id,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            profile_image_url: data.profile_image_url,
            role: data.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite profile fields, keeping creation time and (unless given) role
    pub fn apply_upsert(&mut self, data: UpsertUser, now: DateTime<Utc>) {
        self.email = data.email;
        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.profile_image_url = data.profile_image_url;
        if let Some(role) = data.role {
            self.role = role;
        }
        self.updated_at = now;
    }
}

/// Login profile used to insert or refresh a user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    /// Subject id issued by the identity provider
    #[serde(default)]
    pub id: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(url(message = "Invalid profile image URL"))]
    pub profile_image_url: Option<String>,
    pub role: Option<UserRole>,
}
