pub mod app_state;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod startup;

pub use app_state::AppState;
pub use config::{Config, SignatureMode};
pub use error::ApiError;
