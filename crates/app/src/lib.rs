// Library exports shared by the CLI and its tests

pub mod api;
pub mod build_info;
pub mod logging;
pub mod state;

pub use api::{ApiClient, ApiError};
pub use state::{AppConfig, AppState, StateError};
