mod common;

use anyhow::Result;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use common::FakeUpstream;
use user_admin_api::cli::commands::{self, AdminClient};
use user_admin_api::cli::OutputFormat;

const UNKNOWN_ID: &str = "00000000-0000-4000-8000-000000000000";

fn admin_endpoint() -> Router {
    Router::new().route(
        "/admin-users",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer cli-token");
            if !authorized {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })));
            }
            match body["action"].as_str() {
                Some("create_user") => (
                    StatusCode::OK,
                    Json(json!({
                        "success": true,
                        "user": {
                            "id": "3b8d7e6f-5a4c-4b2d-9e1f-112233445566",
                            "email": body["payload"]["email"]
                        }
                    })),
                ),
                Some("delete_user") => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "User not found" })),
                ),
                _ => (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid action" }))),
            }
        }),
    )
}

#[tokio::test]
async fn create_posts_the_action_envelope() -> Result<()> {
    let upstream = FakeUpstream::spawn(admin_endpoint()).await?;
    let client = AdminClient::new(format!("{}/admin-users", upstream.base_url), "cli-token".into());

    commands::create(
        &client,
        "cli@x.io".into(),
        "pw".into(),
        Some("Cli User".into()),
        None,
        OutputFormat::Json,
    )
    .await?;

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body,
        json!({
            "action": "create_user",
            "payload": { "email": "cli@x.io", "password": "pw", "full_name": "Cli User" }
        })
    );
    Ok(())
}

#[tokio::test]
async fn server_error_becomes_a_command_failure() -> Result<()> {
    let upstream = FakeUpstream::spawn(admin_endpoint()).await?;
    let client = AdminClient::new(format!("{}/admin-users", upstream.base_url), "cli-token".into());

    let err = commands::delete(&client, UNKNOWN_ID.into(), OutputFormat::Text)
        .await
        .expect_err("delete of unknown user fails");

    assert_eq!(err.to_string(), "User not found (400 Bad Request)");
    assert_eq!(upstream.requests()[0].body["payload"]["userId"], UNKNOWN_ID);
    Ok(())
}

#[tokio::test]
async fn wrong_token_is_reported() -> Result<()> {
    let upstream = FakeUpstream::spawn(admin_endpoint()).await?;
    let client = AdminClient::new(format!("{}/admin-users", upstream.base_url), "other".into());

    let reply = client.send("delete_user", json!({ "userId": "x" })).await?;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn failed_command_reports_its_error_once() -> Result<()> {
    let upstream = FakeUpstream::spawn(admin_endpoint()).await?;

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_useradmin"))
        .args(["delete", UNKNOWN_ID])
        .env("USERADMIN_URL", format!("{}/admin-users", upstream.base_url))
        .env("USERADMIN_TOKEN", "cli-token")
        .env_remove("CLI_VERBOSE")
        .output()
        .await?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("User not found").count(), 1, "stderr: {}", stderr);
    assert!(output.stdout.is_empty());
    Ok(())
}
