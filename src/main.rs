use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use user_admin_api::{app, config, AppState, ADMIN_USERS_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting User Admin API in {:?} mode", config.environment);
    tracing::debug!("Configuration: {:?}", config);

    for problem in config.misconfigurations() {
        tracing::warn!("Misconfiguration: {}; requests depending on it will fail", problem);
    }

    let state = AppState::from_config(config).await?;

    let mut app = app(state);
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("User Admin API listening on http://{}{}", bind_addr, ADMIN_USERS_PATH);

    axum::serve(listener, app).await?;
    Ok(())
}
