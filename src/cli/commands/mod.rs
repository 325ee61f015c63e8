use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

/// Thin client for the admin endpoint
pub struct AdminClient {
    http: reqwest::Client,
    url: String,
    token: String,
}

/// Server answer: status plus decoded JSON body
pub struct AdminReply {
    pub status: reqwest::StatusCode,
    pub body: Value,
}

impl AdminClient {
    pub fn new(url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            token,
        }
    }

    pub async fn send(&self, action: &str, payload: Value) -> anyhow::Result<AdminReply> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&json!({ "action": action, "payload": payload }))
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?;

        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .with_context(|| format!("non-JSON response from {} ({})", self.url, status))?;

        Ok(AdminReply { status, body })
    }
}

pub async fn create(
    client: &AdminClient,
    email: String,
    password: String,
    full_name: Option<String>,
    role: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut payload = json!({ "email": email, "password": password });
    if let Some(full_name) = full_name {
        payload["full_name"] = json!(full_name);
    }
    if let Some(role) = role {
        payload["role"] = json!(role);
    }

    let reply = client.send("create_user", payload).await?;
    if !reply.status.is_success() {
        return fail(&reply, &output_format);
    }

    let id = reply.body["user"]["id"].as_str().unwrap_or("<unknown>").to_string();
    output_success(&output_format, &format!("Created user {} ({})", email, id), Some(reply.body))
}

pub async fn delete(
    client: &AdminClient,
    user_id: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let reply = client.send("delete_user", json!({ "userId": user_id })).await?;
    if !reply.status.is_success() {
        return fail(&reply, &output_format);
    }

    output_success(&output_format, &format!("Deleted user {}", user_id), None)
}

fn fail(reply: &AdminReply, output_format: &OutputFormat) -> anyhow::Result<()> {
    let message = reply.body["error"].as_str().unwrap_or("request failed");
    output_error(output_format, message, Some(reply.status.as_str()))?;
    anyhow::bail!("{} ({})", message, reply.status)
}
