use std::marker::PhantomData;

use async_trait::async_trait;
use uuid::Uuid;

use super::{BestEffort, DatabaseError, DatabaseManager, RecordStore, StoreError, TableRow};
use crate::config::IdentityConfig;
use crate::upstream;

/// Table reached through the provider's PostgREST gateway (`/rest/v1/{table}`)
pub struct RestTable<R> {
    http: reqwest::Client,
    url: String,
    service_role_key: String,
    table: String,
    _row: PhantomData<fn() -> R>,
}

impl<R: TableRow> RestTable<R> {
    pub fn new(
        http: reqwest::Client,
        config: &IdentityConfig,
        table: impl Into<String>,
    ) -> Result<Self, DatabaseError> {
        let table = table.into();
        if !DatabaseManager::is_valid_table_name(&table) {
            return Err(DatabaseError::InvalidTableName(table));
        }
        Ok(Self {
            http,
            url: config.url.clone(),
            service_role_key: config.service_role_key.clone(),
            table,
            _row: PhantomData,
        })
    }

    fn endpoint(&self) -> Result<url::Url, StoreError> {
        upstream::base_url(&self.url)
            .and_then(|base| base.join(&format!("rest/v1/{}", self.table)))
            .map_err(|e| StoreError::InvalidUrl(format!("'{}': {}", self.url, e)))
    }

    async fn rejection(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        StoreError::Rejected {
            status: status.as_u16(),
            message: upstream::error_message(status, &body),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<u64>, StoreError> {
        let mut url = self.endpoint()?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));

        let response = upstream::with_service_key(self.http.delete(url), &self.service_role_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(None)
    }
}

#[async_trait]
impl<R: TableRow> RecordStore<R> for RestTable<R> {
    fn table(&self) -> &str {
        &self.table
    }

    async fn insert(&self, row: &R) -> Result<(), StoreError> {
        let url = self.endpoint()?;

        let response = upstream::with_service_key(self.http.post(url), &self.service_role_key)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> BestEffort {
        self.delete(id).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ProfileRow;

    fn table(url: &str) -> RestTable<ProfileRow> {
        RestTable::new(
            reqwest::Client::new(),
            &IdentityConfig {
                url: url.into(),
                service_role_key: "service-key".into(),
            },
            "profiles",
        )
        .unwrap()
    }

    #[test]
    fn endpoint_targets_the_rest_gateway() {
        let url = table("https://project.example.test").endpoint().unwrap();
        assert_eq!(url.as_str(), "https://project.example.test/rest/v1/profiles");
    }

    #[tokio::test]
    async fn delete_with_empty_url_is_ignored_not_raised() {
        let outcome = table("").delete_by_id(Uuid::new_v4()).await;
        assert!(matches!(outcome, BestEffort::Ignored(StoreError::InvalidUrl(_))));
    }
}
