pub mod api;
pub mod app_state;
pub mod artifacts;
mod aws;
pub mod config;
pub mod error;
pub mod llm;

pub use app_state::AppState;
