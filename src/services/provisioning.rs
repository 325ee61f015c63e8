use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::database::{BestEffort, ProfileRow, RecordStore, StoreError, UserRow};
use crate::identity::{Account, AccountMetadata, IdentityError, NewAccount};
use crate::state::AppState;
use crate::types::{CreateUser, DeleteUser, UserCreated, UserDeleted};

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("User creation failed: identity provider returned no account")]
    AccountCreationFailed,
}

/// Creates and removes the user record across the identity provider and both tables.
///
/// There is no cross-store transaction. `create_user` stops at the first
/// failed write and leaves earlier writes in place; `delete_user` tolerates
/// failed table deletes and only fails if the identity account cannot be
/// removed.
pub struct UserProvisioner<'a> {
    state: &'a AppState,
}

impl<'a> UserProvisioner<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn create_user(&self, request: CreateUser) -> Result<UserCreated, ProvisioningError> {
        let role = request.effective_role().to_string();
        info!("Creating user {} with role '{}'", request.email, role);

        let new_account = NewAccount {
            email: request.email.clone(),
            password: request.password,
            email_confirm: true,
            user_metadata: AccountMetadata {
                full_name: request.full_name.clone(),
            },
        };

        let account: Account = self
            .state
            .identity
            .create_account(&new_account)
            .await
            .map_err(|e| {
                error!("Identity provider refused account for {}: {}", request.email, e);
                e
            })?
            .ok_or(ProvisioningError::AccountCreationFailed)?;

        let user_id = account.id;

        let profile = ProfileRow::new(
            user_id,
            request.email.clone(),
            request.full_name.clone(),
            role.clone(),
        );
        self.insert_or_report(self.state.profiles.as_ref(), &profile, user_id).await?;

        let user = UserRow::new(user_id, request.email, request.full_name, role, Utc::now());
        self.insert_or_report(self.state.users.as_ref(), &user, user_id).await?;

        info!("Created user {}", user_id);
        Ok(UserCreated { success: true, user: account })
    }

    pub async fn delete_user(&self, request: DeleteUser) -> Result<UserDeleted, ProvisioningError> {
        let user_id = request.user_id;
        info!("Deleting user {}", user_id);

        let profile = self.state.profiles.delete_by_id(user_id).await;
        Self::report_cleanup(self.state.profiles.table(), user_id, &profile);

        let user = self.state.users.delete_by_id(user_id).await;
        Self::report_cleanup(self.state.users.table(), user_id, &user);

        self.state.identity.delete_account(user_id).await.map_err(|e| {
            error!("Identity provider refused to delete account {}: {}", user_id, e);
            e
        })?;

        info!("Deleted user {}", user_id);
        Ok(UserDeleted::new())
    }

    async fn insert_or_report<R: crate::database::TableRow>(
        &self,
        store: &dyn RecordStore<R>,
        row: &R,
        user_id: Uuid,
    ) -> Result<(), ProvisioningError> {
        store.insert(row).await.map_err(|e| {
            error!(
                "Insert into '{}' failed for {}: {}; identity account {} is left without a complete record",
                store.table(),
                user_id,
                e,
                user_id
            );
            ProvisioningError::from(e)
        })
    }

    fn report_cleanup(table: &str, user_id: Uuid, outcome: &BestEffort) {
        if let Some(e) = outcome.ignored_error() {
            warn!("Ignoring failed delete from '{}' for {}: {}", table, user_id, e);
        } else if outcome.rows() == Some(0) {
            info!("No '{}' row for {} to delete", table, user_id);
        }
    }
}
