pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;
pub mod types;
pub mod upstream;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use router::{app, ADMIN_USERS_PATH};
pub use state::AppState;
