#[allow(clippy::module_inception)]
mod client;
mod error;
pub mod pastes;
pub mod users;

pub use client::ApiClient;
pub use error::ApiError;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    /// Status the service answers with on success
    const EXPECTED_STATUS: StatusCode = StatusCode::OK;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
