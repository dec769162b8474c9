//! API layer - HTTP endpoints

pub mod admin;
pub mod error;
pub mod health;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
