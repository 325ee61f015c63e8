use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::error::ApiError;
use crate::identity::CallerIdentity;
use crate::state::AppState;

const UNAUTHORIZED: &str = "Unauthorized";

/// Caller whose bearer token the identity provider accepted.
///
/// Extracting this runs before the body is read, so a rejected caller never
/// reaches a store.
#[derive(Clone, Debug)]
pub struct AdminCaller(pub CallerIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).map_err(|msg| {
            tracing::warn!("Rejecting admin request: {}", msg);
            ApiError::unauthorized(UNAUTHORIZED)
        })?;

        match state.identity.resolve_token(token).await {
            Ok(Some(caller)) => {
                tracing::debug!("Admin request from {} ({:?})", caller.id, caller.email);
                Ok(AdminCaller(caller))
            }
            Ok(None) => {
                tracing::warn!("Rejecting admin request: token resolved to no user");
                Err(ApiError::unauthorized(UNAUTHORIZED))
            }
            Err(e) => {
                tracing::warn!("Rejecting admin request: {}", e);
                Err(ApiError::unauthorized(UNAUTHORIZED))
            }
        }
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("bearer "))
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(extract_bearer_token(&headers("bearer  abc ")), Ok("abc"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Err("Missing Authorization header"));
        assert!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert_eq!(extract_bearer_token(&headers("Bearer   ")), Err("Empty bearer token"));
    }
}
