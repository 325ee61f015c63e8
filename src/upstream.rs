// Shared helpers for talking to the provider's REST endpoints
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

/// Normalize a base URL so that relative joins keep its path
pub fn base_url(raw: &str) -> Result<url::Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        url::Url::parse(trimmed)
    } else {
        url::Url::parse(&format!("{}/", trimmed))
    }
}

/// Attach the service-role key the way the provider's gateway expects it
pub fn with_service_key(request: RequestBuilder, service_role_key: &str) -> RequestBuilder {
    request
        .header("apikey", service_role_key)
        .bearer_auth(service_role_key)
}

/// Reduce an upstream error body to a single human message.
///
/// Checks the fields the auth and REST gateways use, then the raw text, then
/// the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                if !message.is_empty() {
                    return message.clone();
                }
            }
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Upstream request failed with status {}", status.as_u16()))
}
