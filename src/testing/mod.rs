//! In-memory collaborators for tests and local runs.
//!
//! Every call is recorded so tests can assert which stores a request touched,
//! and failures can be injected per operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::{BestEffort, ProfileRow, RecordStore, StoreError, TableRow, UserRow};
use crate::identity::{Account, CallerIdentity, IdentityError, IdentityProvider, NewAccount};
use crate::state::AppState;

/// Token accepted by the identity in a fresh `TestContext`
pub const ADMIN_TOKEN: &str = "admin-token";

#[derive(Default)]
struct IdentityInner {
    tokens: HashMap<String, CallerIdentity>,
    accounts: HashMap<Uuid, Account>,
    calls: Vec<String>,
    create_failure: Option<String>,
    delete_failure: Option<String>,
    return_no_account: bool,
}

/// Identity provider backed by a map of accounts
#[derive(Default)]
pub struct MemoryIdentity {
    inner: Mutex<IdentityInner>,
}

impl MemoryIdentity {
    pub fn with_token(token: impl Into<String>, caller: CallerIdentity) -> Self {
        let mut inner = IdentityInner::default();
        inner.tokens.insert(token.into(), caller);
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub async fn fail_creates(&self, message: impl Into<String>) {
        self.inner.lock().await.create_failure = Some(message.into());
    }

    pub async fn fail_deletes(&self, message: impl Into<String>) {
        self.inner.lock().await.delete_failure = Some(message.into());
    }

    /// Accept creations but answer without an account object
    pub async fn return_no_account(&self) {
        self.inner.lock().await.return_no_account = true;
    }

    pub async fn seed_account(&self, email: &str) -> Uuid {
        let account = new_account_record(email, None);
        let id = account.id;
        self.inner.lock().await.accounts.insert(id, account);
        id
    }

    pub async fn has_account(&self, id: Uuid) -> bool {
        self.inner.lock().await.accounts.contains_key(&id)
    }

    pub async fn account_ids(&self) -> Vec<Uuid> {
        self.inner.lock().await.accounts.keys().copied().collect()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.inner.lock().await.calls.clone()
    }
}

fn new_account_record(email: &str, full_name: Option<&str>) -> Account {
    let now = chrono::Utc::now().to_rfc3339();
    let mut extra = Map::new();
    extra.insert("aud".into(), json!("authenticated"));
    extra.insert("role".into(), json!("authenticated"));
    extra.insert("created_at".into(), json!(now));

    Account {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
        email_confirmed_at: Some(now),
        user_metadata: json!({ "full_name": full_name }),
        extra,
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn resolve_token(&self, token: &str) -> Result<Option<CallerIdentity>, IdentityError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push("resolve_token".to_string());
        match inner.tokens.get(token) {
            Some(caller) => Ok(Some(caller.clone())),
            None => Err(IdentityError::Rejected {
                status: 401,
                message: "invalid JWT: unable to parse or verify signature".to_string(),
            }),
        }
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Option<Account>, IdentityError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("create_account:{}", account.email));

        if let Some(message) = inner.create_failure.clone() {
            return Err(IdentityError::Rejected { status: 422, message });
        }
        if inner.accounts.values().any(|a| a.email.as_deref() == Some(account.email.as_str())) {
            return Err(IdentityError::Rejected {
                status: 422,
                message: "A user with this email address has already been registered".to_string(),
            });
        }

        let created =
            new_account_record(&account.email, account.user_metadata.full_name.as_deref());
        inner.accounts.insert(created.id, created.clone());

        if inner.return_no_account {
            return Ok(None);
        }
        Ok(Some(created))
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), IdentityError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("delete_account:{}", id));

        if let Some(message) = inner.delete_failure.clone() {
            return Err(IdentityError::Rejected { status: 500, message });
        }
        match inner.accounts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(IdentityError::Rejected {
                status: 404,
                message: "User not found".to_string(),
            }),
        }
    }
}

struct TableInner<R> {
    rows: HashMap<Uuid, R>,
    calls: Vec<String>,
    insert_failure: Option<String>,
    delete_failure: Option<String>,
}

/// Table backed by a map keyed on row id
pub struct MemoryTable<R> {
    table: String,
    inner: Mutex<TableInner<R>>,
}

impl<R: TableRow + Clone> MemoryTable<R> {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            inner: Mutex::new(TableInner {
                rows: HashMap::new(),
                calls: Vec::new(),
                insert_failure: None,
                delete_failure: None,
            }),
        }
    }

    pub async fn fail_inserts(&self, message: impl Into<String>) {
        self.inner.lock().await.insert_failure = Some(message.into());
    }

    pub async fn fail_deletes(&self, message: impl Into<String>) {
        self.inner.lock().await.delete_failure = Some(message.into());
    }

    pub async fn seed(&self, row: R) {
        self.inner.lock().await.rows.insert(row.id(), row);
    }

    pub async fn get(&self, id: Uuid) -> Option<R> {
        self.inner.lock().await.rows.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn calls(&self) -> Vec<String> {
        self.inner.lock().await.calls.clone()
    }
}

#[async_trait]
impl<R: TableRow + Clone> RecordStore<R> for MemoryTable<R> {
    fn table(&self) -> &str {
        &self.table
    }

    async fn insert(&self, row: &R) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("insert:{}", row.id()));

        if let Some(message) = inner.insert_failure.clone() {
            return Err(StoreError::Rejected { status: 400, message });
        }
        if inner.rows.contains_key(&row.id()) {
            return Err(StoreError::Rejected {
                status: 409,
                message: format!(
                    "duplicate key value violates unique constraint \"{}_pkey\"",
                    self.table
                ),
            });
        }
        inner.rows.insert(row.id(), row.clone());
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> BestEffort {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("delete:{}", id));

        if let Some(message) = inner.delete_failure.clone() {
            return BestEffort::Ignored(StoreError::Rejected { status: 500, message });
        }
        let rows = u64::from(inner.rows.remove(&id).is_some());
        BestEffort::Applied { rows: Some(rows) }
    }
}

/// Application state wired to in-memory collaborators, with handles kept for assertions
pub struct TestContext {
    pub identity: Arc<MemoryIdentity>,
    pub profiles: Arc<MemoryTable<ProfileRow>>,
    pub users: Arc<MemoryTable<UserRow>>,
    pub admin: CallerIdentity,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let admin = CallerIdentity {
            id: Uuid::new_v4(),
            email: Some("admin@example.com".to_string()),
            role: Some("authenticated".to_string()),
        };
        let identity = Arc::new(MemoryIdentity::with_token(ADMIN_TOKEN, admin.clone()));
        let profiles = Arc::new(MemoryTable::<ProfileRow>::new("profiles"));
        let users = Arc::new(MemoryTable::<UserRow>::new("users"));

        let state = AppState::new(identity.clone(), profiles.clone(), users.clone());

        Self {
            identity,
            profiles,
            users,
            admin,
            state,
        }
    }

    /// True when either table saw any call
    pub async fn tables_touched(&self) -> bool {
        !self.profiles.calls().await.is_empty() || !self.users.calls().await.is_empty()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_table_reports_zero_rows_for_absent_ids() {
        let table = MemoryTable::<ProfileRow>::new("profiles");
        let outcome = table.delete_by_id(Uuid::new_v4()).await;
        assert!(matches!(outcome, BestEffort::Applied { rows: Some(0) }));
    }

    #[tokio::test]
    async fn memory_identity_rejects_unknown_tokens() {
        let ctx = TestContext::new();
        assert_eq!(ctx.identity.resolve_token(ADMIN_TOKEN).await.unwrap(), Some(ctx.admin.clone()));
        assert!(ctx.identity.resolve_token("forged").await.is_err());
    }
}
