use std::time::Duration;

use async_trait::async_trait;
use common::service::{CreatePasteResponse, PasteRequest, PasteService};
use reqwest::{header::HeaderMap, header::HeaderValue, Client};
use url::Url;

use super::error::ApiError;
use super::pastes::CreatePaste;
use super::ApiRequest;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url, timeout: Duration) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        let status = response.status();
        if status == T::EXPECTED_STATUS {
            Ok(response.json::<T::Response>().await?)
        } else {
            tracing::debug!(%status, url = %response.url(), "unexpected response status");
            Err(ApiError::HttpStatus(status, response.text().await?))
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }
}

#[async_trait]
impl PasteService for ApiClient {
    type Error = ApiError;

    async fn create_paste(
        &self,
        request: &PasteRequest,
        token: &str,
    ) -> Result<CreatePasteResponse, Self::Error> {
        self.call(CreatePaste {
            request: request.clone(),
            token: token.to_string(),
        })
        .await
    }
}
