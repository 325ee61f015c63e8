use axum::{routing::get, Router};

use crate::handlers;
use crate::middleware::cors_layer;
use crate::state::AppState;

/// Path the admin dispatcher is mounted on
pub const ADMIN_USERS_PATH: &str = "/admin-users";

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .merge(public_routes())
        // Elevated (bearer token resolved per request)
        .merge(admin_routes())
        .with_state(state)
        // Global middleware
        .layer(cors_layer())
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
}

fn admin_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::elevated;

    // OPTIONS is answered by the CORS layer before routing
    Router::new().route(ADMIN_USERS_PATH, post(elevated::admin_users))
}
