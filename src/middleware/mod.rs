pub mod auth;
pub mod cors;

pub use auth::AdminCaller;
pub use cors::cors_layer;
