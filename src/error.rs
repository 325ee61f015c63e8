// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::provisioning::ProvisioningError;
use crate::types::RequestError;

/// HTTP API error with status codes and client-facing messages.
///
/// Everything the admin endpoint can fail with collapses into two statuses:
/// 401 for credential problems and 400 for the rest.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(String),
    InvalidJson(String),

    // 400 Bad Request, message passed through from the identity provider or a table
    UpstreamFailure(String),

    // 401 Unauthorized
    Unauthorized(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::UpstreamFailure(_) => 400,
            ApiError::Unauthorized(_) => 401,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::UpstreamFailure(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
        }
    }

    /// Error code used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::UpstreamFailure(_) => "UPSTREAM_FAILURE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn upstream_failure(message: impl Into<String>) -> Self {
        ApiError::UpstreamFailure(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            err @ RequestError::InvalidJson(_) => ApiError::invalid_json(err.to_string()),
            other => ApiError::validation_error(other.to_string()),
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Identity(e) => ApiError::upstream_failure(e.to_string()),
            ProvisioningError::Store(e) => ApiError::upstream_failure(e.to_string()),
            ProvisioningError::AccountCreationFailed => {
                ApiError::bad_request(ProvisioningError::AccountCreationFailed.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
        tracing::debug!("Responding {} ({}): {}", status, self.error_code(), self.message());
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;
    use crate::identity::IdentityError;

    #[test]
    fn only_credential_errors_are_401() {
        assert_eq!(ApiError::unauthorized("Unauthorized").status_code(), 401);
        assert_eq!(ApiError::validation_error("Invalid action").status_code(), 400);
        assert_eq!(ApiError::invalid_json("bad").status_code(), 400);
        assert_eq!(ApiError::upstream_failure("boom").status_code(), 400);
    }

    #[test]
    fn body_carries_only_the_message() {
        let body = ApiError::unauthorized("Unauthorized").to_json();
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }

    #[test]
    fn upstream_messages_pass_through_verbatim() {
        let err: ApiError = ProvisioningError::Identity(IdentityError::Rejected {
            status: 422,
            message: "A user with this email address has already been registered".into(),
        })
        .into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "A user with this email address has already been registered");

        let err: ApiError = ProvisioningError::Store(StoreError::Rejected {
            status: 409,
            message: "duplicate key value violates unique constraint \"profiles_pkey\"".into(),
        })
        .into();
        assert_eq!(
            err.message(),
            "duplicate key value violates unique constraint \"profiles_pkey\""
        );
    }

    #[test]
    fn request_errors_map_to_validation() {
        let err: ApiError = RequestError::InvalidAction.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid action");
    }
}
