use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Identity provider project URL and privileged key
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub url: String,
    pub service_role_key: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field(
                "service_role_key",
                &if self.service_role_key.is_empty() {
                    "<empty>"
                } else {
                    "<redacted>"
                },
            )
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    /// Tables reached through the provider's REST gateway
    Rest,
    /// Tables reached directly over a Postgres connection
    Postgres,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub profiles_table: String,
    pub users_table: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("connection_timeout", &self.connection_timeout)
            .field("profiles_table", &self.profiles_table)
            .field("users_table", &self.users_table)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Identity provider; empty strings pass through untouched
        self.identity.url = env::var("SUPABASE_URL").unwrap_or_default();
        self.identity.service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_default();

        // Storage overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.storage.database_url = Some(v);
                self.storage.backend = StorageBackend::Postgres;
            }
        }
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "rest" => self.storage.backend = StorageBackend::Rest,
                "postgres" | "pg" => self.storage.backend = StorageBackend::Postgres,
                other => tracing::warn!("Ignoring unknown STORAGE_BACKEND '{}'", other),
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.storage.max_connections = v.parse().unwrap_or(self.storage.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.storage.connection_timeout = v.parse().unwrap_or(self.storage.connection_timeout);
        }
        if let Ok(v) = env::var("PROFILES_TABLE") {
            self.storage.profiles_table = v;
        }
        if let Ok(v) = env::var("USERS_TABLE") {
            self.storage.users_table = v;
        }

        // API overrides
        if let Some(port) = env::var("ADMIN_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        self
    }

    /// Settings that will make every request fail even though startup succeeds
    pub fn misconfigurations(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.identity.url.trim().is_empty() {
            problems.push("SUPABASE_URL is empty");
        }
        if self.identity.service_role_key.trim().is_empty() {
            problems.push("SUPABASE_SERVICE_ROLE_KEY is empty");
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            problems.push("STORAGE_BACKEND=postgres without DATABASE_URL");
        }
        problems
    }

    fn storage_defaults(max_connections: u32, connection_timeout: u64) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Rest,
            database_url: None,
            max_connections,
            connection_timeout,
            profiles_table: "profiles".to_string(),
            users_table: "users".to_string(),
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            identity: IdentityConfig::default(),
            storage: Self::storage_defaults(5, 30),
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            identity: IdentityConfig::default(),
            storage: Self::storage_defaults(10, 10),
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            identity: IdentityConfig::default(),
            storage: Self::storage_defaults(20, 5),
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
            },
        }
    }
}

// Global singleton config - read by the binaries only, handlers get their clients injected
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
