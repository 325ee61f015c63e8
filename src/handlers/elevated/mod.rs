// handlers/elevated/mod.rs - privileged user provisioning
//
// POST /admin-users carries {action, payload}. The caller is resolved from the
// bearer token before the body is read; the action is then parsed into
// AdminAction and handed to UserProvisioner.
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::AdminCaller;
use crate::services::UserProvisioner;
use crate::state::AppState;
use crate::types::AdminAction;

/// POST /admin-users - dispatch a provisioning action
pub async fn admin_users(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let action = AdminAction::from_body(&body)?;
    tracing::info!("Admin {} requested {}", caller.id, action.name());

    let provisioner = UserProvisioner::new(&state);
    let result = match action {
        AdminAction::CreateUser(request) => to_value(provisioner.create_user(request).await?)?,
        AdminAction::DeleteUser(request) => to_value(provisioner.delete_user(request).await?)?,
    };

    Ok(Json(result))
}

fn to_value<T: serde::Serialize>(result: T) -> Result<Value, ApiError> {
    serde_json::to_value(result).map_err(|e| {
        tracing::error!("Failed to serialize response data: {}", e);
        ApiError::bad_request("Failed to serialize response data")
    })
}
