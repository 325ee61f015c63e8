pub mod gotrue;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use gotrue::GoTrueClient;

/// Errors reported by the identity provider
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider answered and refused; `message` is its own wording
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid identity provider URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Caller resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Account as returned by the provider on creation.
///
/// Unknown provider fields are kept in `extra` so the response can echo the
/// account the way the provider described it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for account creation
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    pub user_metadata: AccountMetadata,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountMetadata {
    pub full_name: Option<String>,
}

/// External authentication service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to its user; `Ok(None)` when the provider knows no such user
    async fn resolve_token(&self, token: &str) -> Result<Option<CallerIdentity>, IdentityError>;

    /// Create a confirmed account; `Ok(None)` when the provider accepted but returned no account
    async fn create_account(&self, account: &NewAccount) -> Result<Option<Account>, IdentityError>;

    async fn delete_account(&self, id: Uuid) -> Result<(), IdentityError>;
}
