/// Request envelope and the closed set of admin actions

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::identity::Account;

/// Role assigned when `create_user` does not name one
pub const DEFAULT_ROLE: &str = "student";

/// Raw `{action, payload}` body before the action tag is checked
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionEnvelope {
    pub action: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

/// Problems with the request body itself, before any collaborator is called
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Invalid action")]
    InvalidAction,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Every action the dispatcher understands
#[derive(Debug, Clone, PartialEq)]
pub enum AdminAction {
    CreateUser(CreateUser),
    DeleteUser(DeleteUser),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

impl CreateUser {
    pub fn effective_role(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteUser {
    pub user_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
struct CreateUserFields {
    email: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeleteUserFields {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

impl AdminAction {
    /// Decode a raw request body into an action
    pub fn from_body(body: &[u8]) -> Result<Self, RequestError> {
        let envelope: ActionEnvelope =
            serde_json::from_slice(body).map_err(|e| RequestError::InvalidJson(e.to_string()))?;
        Self::try_from(envelope)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::CreateUser(_) => "create_user",
            AdminAction::DeleteUser(_) => "delete_user",
        }
    }
}

impl TryFrom<ActionEnvelope> for AdminAction {
    type Error = RequestError;

    fn try_from(envelope: ActionEnvelope) -> Result<Self, Self::Error> {
        match envelope.action.as_deref().unwrap_or_default() {
            "create_user" => {
                let fields: CreateUserFields = payload_fields(envelope.payload)?;
                Ok(AdminAction::CreateUser(CreateUser {
                    email: required(fields.email, "email")?,
                    password: required(fields.password, "password")?,
                    full_name: fields.full_name,
                    role: fields.role.filter(|r| !r.is_empty()),
                }))
            }
            "delete_user" => {
                let fields: DeleteUserFields = payload_fields(envelope.payload)?;
                let raw = required(fields.user_id, "userId")?;
                let user_id = Uuid::parse_str(raw.trim()).map_err(|e| RequestError::InvalidField {
                    field: "userId",
                    reason: e.to_string(),
                })?;
                Ok(AdminAction::DeleteUser(DeleteUser { user_id }))
            }
            _ => Err(RequestError::InvalidAction),
        }
    }
}

fn payload_fields<T>(payload: Value) -> Result<T, RequestError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload).map_err(|e| RequestError::InvalidJson(e.to_string()))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RequestError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RequestError::MissingField(field)),
    }
}

/// `{success: true, user}` returned by `create_user`
#[derive(Debug, Serialize)]
pub struct UserCreated {
    pub success: bool,
    pub user: Account,
}

/// `{success: true, message}` returned by `delete_user`
#[derive(Debug, Serialize)]
pub struct UserDeleted {
    pub success: bool,
    pub message: &'static str,
}

impl UserDeleted {
    pub fn new() -> Self {
        Self {
            success: true,
            message: "User deleted",
        }
    }
}

impl Default for UserDeleted {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<AdminAction, RequestError> {
        AdminAction::from_body(body.to_string().as_bytes())
    }

    #[test]
    fn parses_create_user_with_optional_fields() {
        let action = parse(json!({
            "action": "create_user",
            "payload": { "email": "a@example.com", "password": "hunter22", "full_name": "Ada" }
        }))
        .unwrap();

        match action {
            AdminAction::CreateUser(create) => {
                assert_eq!(create.email, "a@example.com");
                assert_eq!(create.full_name.as_deref(), Some("Ada"));
                assert_eq!(create.effective_role(), "student");
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn explicit_role_wins_over_default() {
        let action = parse(json!({
            "action": "create_user",
            "payload": { "email": "a@example.com", "password": "pw", "role": "teacher" }
        }))
        .unwrap();
        let AdminAction::CreateUser(create) = action else { panic!("expected create_user") };
        assert_eq!(create.effective_role(), "teacher");
    }

    #[test]
    fn create_user_requires_email_and_password() {
        let err =
            parse(json!({ "action": "create_user", "payload": { "password": "pw" } })).unwrap_err();
        assert_eq!(err, RequestError::MissingField("email"));

        let err = parse(json!({
            "action": "create_user",
            "payload": { "email": "a@example.com" }
        }))
        .unwrap_err();
        assert_eq!(err, RequestError::MissingField("password"));

        let err = parse(json!({ "action": "create_user" })).unwrap_err();
        assert_eq!(err, RequestError::MissingField("email"));
    }

    #[test]
    fn parses_delete_user() {
        let id = Uuid::new_v4();
        let action = parse(json!({
            "action": "delete_user",
            "payload": { "userId": id.to_string() }
        }))
        .unwrap();
        assert_eq!(action, AdminAction::DeleteUser(DeleteUser { user_id: id }));
        assert_eq!(action.name(), "delete_user");
    }

    #[test]
    fn delete_user_rejects_malformed_id() {
        let err = parse(json!({
            "action": "delete_user",
            "payload": { "userId": "not-a-uuid" }
        }))
        .unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: "userId", .. }));

        let err = parse(json!({ "action": "delete_user", "payload": {} })).unwrap_err();
        assert_eq!(err, RequestError::MissingField("userId"));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = parse(json!({ "action": "update_user", "payload": {} })).unwrap_err();
        assert_eq!(err, RequestError::InvalidAction);
        assert_eq!(err.to_string(), "Invalid action");

        let err = parse(json!({ "payload": {} })).unwrap_err();
        assert_eq!(err, RequestError::InvalidAction);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = AdminAction::from_body(b"{not json").unwrap_err();
        assert!(matches!(err, RequestError::InvalidJson(_)));
    }

    #[test]
    fn deleted_body_shape() {
        let body = serde_json::to_value(UserDeleted::new()).unwrap();
        assert_eq!(body, json!({ "success": true, "message": "User deleted" }));
    }
}
