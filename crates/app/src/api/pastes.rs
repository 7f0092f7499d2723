use common::service::{CreatePasteResponse, PasteRecord, PasteRequest};
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use super::{ApiError, ApiRequest};

/// Submit a sealed paste on behalf of a logged-in account
#[derive(Debug, Clone)]
pub struct CreatePaste {
    pub request: PasteRequest,
    pub token: String,
}

impl ApiRequest for CreatePaste {
    type Response = CreatePasteResponse;
    const EXPECTED_STATUS: StatusCode = StatusCode::CREATED;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/pastes")?;
        Ok(client
            .post(full_url)
            .bearer_auth(&self.token)
            .json(&self.request))
    }
}

/// Fetch one paste by its durable id
#[derive(Debug, Clone)]
pub struct GetPaste {
    pub id: String,
}

impl ApiRequest for GetPaste {
    type Response = PasteRecord;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let mut full_url = base_url.join("/api/pastes/")?;
        full_url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&self.id);
        Ok(client.get(full_url))
    }
}

/// List every paste signed by `public_key`
#[derive(Debug, Clone)]
pub struct ListPastes {
    pub public_key: String,
}

impl ApiRequest for ListPastes {
    type Response = Vec<PasteRecord>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let mut full_url = base_url.join("/api/pastes")?;
        full_url
            .query_pairs_mut()
            .append_pair("public_key", &self.public_key);
        Ok(client.get(full_url))
    }
}
