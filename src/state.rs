use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::database::{
    DatabaseError, DatabaseManager, PgTable, ProfileRow, RecordStore, RestTable, UserRow,
};
use crate::identity::{GoTrueClient, IdentityProvider};

/// Collaborators handed to every request.
///
/// Cloning is cheap; each handler gets its own handle to the shared clients.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn RecordStore<ProfileRow>>,
    pub users: Arc<dyn RecordStore<UserRow>>,
    /// Present when the tables are reached over Postgres, used by `/health`
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn RecordStore<ProfileRow>>,
        users: Arc<dyn RecordStore<UserRow>>,
    ) -> Self {
        Self {
            identity,
            profiles,
            users,
            pool: None,
        }
    }

    /// Build the production collaborators from configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        let http = reqwest::Client::new();
        let identity = Arc::new(GoTrueClient::new(http.clone(), &config.identity));
        let storage = &config.storage;

        match storage.backend {
            StorageBackend::Rest => {
                info!(
                    "Tables '{}' and '{}' via REST gateway",
                    storage.profiles_table, storage.users_table
                );
                let profiles = RestTable::<ProfileRow>::new(
                    http.clone(),
                    &config.identity,
                    &storage.profiles_table,
                )?;
                let users =
                    RestTable::<UserRow>::new(http, &config.identity, &storage.users_table)?;
                Ok(Self::new(identity, Arc::new(profiles), Arc::new(users)))
            }
            StorageBackend::Postgres => {
                info!(
                    "Tables '{}' and '{}' via Postgres",
                    storage.profiles_table, storage.users_table
                );
                let pool = DatabaseManager::connect(storage).await?;
                let profiles = PgTable::<ProfileRow>::new(pool.clone(), &storage.profiles_table)?;
                let users = PgTable::<UserRow>::new(pool.clone(), &storage.users_table)?;
                let mut state = Self::new(identity, Arc::new(profiles), Arc::new(users));
                state.pool = Some(pool);
                Ok(state)
            }
        }
    }
}
