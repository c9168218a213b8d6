//! Application settings loaded from environment variables.

use std::env;

use serde::Serialize;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_DEMO_USER_ID, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_STORAGE_TYPE, STORAGE_TYPE_FIREBASE, STORAGE_TYPE_MEMORY, STORAGE_TYPE_POSTGRES,
};

/// Storage backend selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Firestore collections
    Document,
    /// PostgreSQL through SeaORM
    Relational,
    /// Process-local tables
    InMemory,
}

impl StorageKind {
    /// Resolve the requested `STORAGE_TYPE`.
    ///
    /// Firestore is only chosen when credentials are present; anything
    /// unrecognised falls back to the in-memory store.
    pub fn resolve(requested: &str, firebase_enabled: bool) -> Self {
        match requested.trim().to_ascii_lowercase().as_str() {
            STORAGE_TYPE_FIREBASE if firebase_enabled => StorageKind::Document,
            STORAGE_TYPE_POSTGRES => StorageKind::Relational,
            _ => StorageKind::InMemory,
        }
    }

    /// Value reported by the storage status endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Document => STORAGE_TYPE_FIREBASE,
            StorageKind::Relational => STORAGE_TYPE_POSTGRES,
            StorageKind::InMemory => STORAGE_TYPE_MEMORY,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            StorageKind::Document => "Using Firebase Firestore for data storage",
            StorageKind::Relational => "Using PostgreSQL for data storage",
            StorageKind::InMemory => "Using in-memory storage (data is lost on restart)",
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Firebase credentials as supplied through the environment.
#[derive(Clone, Default)]
pub struct FirebaseConfig {
    pub project_id: Option<String>,
    /// Full service-account JSON document
    pub service_account_key: Option<String>,
    pub private_key: Option<String>,
    pub client_email: Option<String>,
    /// `host:port` of a local Firestore emulator
    pub emulator_host: Option<String>,
}

impl FirebaseConfig {
    /// Firebase counts as configured once a project id or key is present.
    pub fn enabled(&self) -> bool {
        self.project_id.is_some() || self.service_account_key.is_some()
    }
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("service_account_key", &self.service_account_key.as_ref().map(|_| "[REDACTED]"))
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("client_email", &self.client_email)
            .field("emulator_host", &self.emulator_host)
            .finish()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Raw `STORAGE_TYPE` value
    pub storage_type: String,
    pub database_url: String,
    pub firebase: FirebaseConfig,
    pub server_host: String,
    pub server_port: u16,
    /// Identity used when the proxy forwards none; `None` enforces a header
    pub demo_user_id: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("storage_type", &self.storage_type)
            .field("database_url", &"[REDACTED]")
            .field("firebase", &self.firebase)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("demo_user_id", &self.demo_user_id)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let demo_user_id = match lookup("DEMO_USER_ID") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => Some(DEFAULT_DEMO_USER_ID.to_string()),
        };

        Self {
            storage_type: non_empty("STORAGE_TYPE")
                .unwrap_or_else(|| DEFAULT_STORAGE_TYPE.to_string()),
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            firebase: FirebaseConfig {
                project_id: non_empty("FIREBASE_PROJECT_ID"),
                service_account_key: non_empty("FIREBASE_SERVICE_ACCOUNT_KEY"),
                private_key: non_empty("FIREBASE_PRIVATE_KEY"),
                client_email: non_empty("FIREBASE_CLIENT_EMAIL"),
                emulator_host: non_empty("FIRESTORE_EMULATOR_HOST"),
            },
            server_host: non_empty("SERVER_HOST")
                .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: non_empty("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            demo_user_id,
        }
    }

    /// In-memory configuration without any external services.
    pub fn in_memory() -> Self {
        Self::from_lookup(|key| match key {
            "STORAGE_TYPE" => Some(STORAGE_TYPE_MEMORY.to_string()),
            _ => None,
        })
    }

    /// Storage backend this configuration selects.
    pub fn storage_kind(&self) -> StorageKind {
        StorageKind::resolve(&self.storage_type, self.firebase.enabled())
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_firebase_requires_credentials() {
        let config = config_with(&[]);
        assert_eq!(config.storage_type, "firebase");
        assert_eq!(config.storage_kind(), StorageKind::InMemory);

        let config = config_with(&[("FIREBASE_PROJECT_ID", "timeboard-dev")]);
        assert_eq!(config.storage_kind(), StorageKind::Document);
    }

    #[test]
    fn test_postgres_and_unknown_types() {
        let config = config_with(&[("STORAGE_TYPE", "postgres")]);
        assert_eq!(config.storage_kind(), StorageKind::Relational);

        let config = config_with(&[("STORAGE_TYPE", "mongo")]);
        assert_eq!(config.storage_kind(), StorageKind::InMemory);
    }

    #[test]
    fn test_demo_user_defaults_and_can_be_disabled() {
        assert_eq!(config_with(&[]).demo_user_id.as_deref(), Some("demo-user"));
        assert_eq!(config_with(&[("DEMO_USER_ID", "")]).demo_user_id, None);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_with(&[
            ("FIREBASE_PRIVATE_KEY", "super-secret"),
            ("DATABASE_URL", "postgres://user:pw@db/app"),
        ]);
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("pw@db"));
    }
}
