use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use super::{Account, CallerIdentity, IdentityError, IdentityProvider, NewAccount};
use crate::config::IdentityConfig;
use crate::upstream;

/// Identity provider client speaking the GoTrue REST API.
///
/// The URL is parsed per call, so an unset `SUPABASE_URL` surfaces as a
/// per-request failure rather than a startup crash.
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    url: String,
    service_role_key: String,
}

impl GoTrueClient {
    pub fn new(http: reqwest::Client, config: &IdentityConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, IdentityError> {
        upstream::base_url(&self.url)
            .and_then(|base| base.join(path))
            .map_err(|e| IdentityError::InvalidUrl(format!("'{}': {}", self.url, e)))
    }

    async fn rejection(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        IdentityError::Rejected {
            status: status.as_u16(),
            message: upstream::error_message(status, &body),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn resolve_token(&self, token: &str) -> Result<Option<CallerIdentity>, IdentityError> {
        let url = self.endpoint("auth/v1/user")?;

        let response = self
            .http
            .get(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: Value = response.json().await?;
        if body.get("id").is_none() {
            return Ok(None);
        }

        Ok(serde_json::from_value(body).ok())
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Option<Account>, IdentityError> {
        let url = self.endpoint("auth/v1/admin/users")?;

        let response = upstream::with_service_key(self.http.post(url), &self.service_role_key)
            .json(account)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: Value = response.json().await?;
        // Some gateway versions wrap the account as {"user": {...}}
        let account = match body.get("user") {
            Some(user) if user.is_object() => user.clone(),
            _ => body,
        };

        if account.get("id").is_none() {
            return Ok(None);
        }

        serde_json::from_value(account)
            .map(Some)
            .map_err(|e| IdentityError::Rejected {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: format!("Unreadable account returned by identity provider: {}", e),
            })
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), IdentityError> {
        let url = self.endpoint(&format!("auth/v1/admin/users/{}", id))?;

        let response = upstream::with_service_key(self.http.delete(url), &self.service_role_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(())
    }
}
