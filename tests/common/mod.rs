#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use user_admin_api::testing::{TestContext, ADMIN_TOKEN};

/// Response pieces the tests assert on
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw: Vec<u8>,
}

/// Router wired to a fresh in-memory context
pub fn test_app() -> (TestContext, Router) {
    let ctx = TestContext::new();
    let app = user_admin_api::app(ctx.state.clone());
    (ctx, app)
}

pub async fn send(app: &Router, request: Request<Body>) -> Result<TestResponse> {
    let response = app.clone().oneshot(request).await.context("router failed")?;
    let status = response.status();
    let headers = response.headers().clone();
    let raw = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .context("failed to read body")?
        .to_vec();
    let body = if raw.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&raw).context("response body is not JSON")?
    };

    Ok(TestResponse { status, headers, body, raw })
}

/// POST /admin-users with the admin token and a raw body
pub fn admin_post(body: impl Into<Body>) -> Request<Body> {
    post_with_token(Some(ADMIN_TOKEN), body)
}

pub fn post_with_token(token: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(user_admin_api::ADMIN_USERS_PATH)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(body.into()).expect("valid request")
}

pub async fn post_action(app: &Router, envelope: Value) -> Result<TestResponse> {
    send(app, admin_post(envelope.to_string())).await
}

/// Request seen by a `FakeUpstream`
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Local HTTP server standing in for the identity provider and its REST gateway
pub struct FakeUpstream {
    pub base_url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    /// Serve `router` on a free port; every request is recorded before it reaches the router
    pub async fn spawn(router: Router) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let recorded: Arc<Mutex<Vec<Recorded>>> = Arc::default();

        let sink = recorded.clone();
        let app = router.layer(axum::middleware::from_fn(
            move |request: Request<Body>, next: axum::middleware::Next| {
                let sink = sink.clone();
                async move {
                    let (parts, body) = request.into_parts();
                    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
                    sink.lock().unwrap().push(Recorded {
                        method: parts.method.clone(),
                        path: parts.uri.path().to_string(),
                        query: parts.uri.query().map(str::to_string),
                        headers: parts.headers.clone(),
                        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
                    });
                    next.run(Request::from_parts(parts, Body::from(bytes))).await
                }
            },
        ));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        Ok(Self {
            base_url: format!("http://{}", addr),
            recorded,
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}
