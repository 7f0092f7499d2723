use common::service::{AuthRequest, AuthResponse, RegisterUserRequest, RegisterUserResponse};
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use super::{ApiError, ApiRequest};

impl ApiRequest for RegisterUserRequest {
    type Response = RegisterUserResponse;
    const EXPECTED_STATUS: StatusCode = StatusCode::CREATED;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/users")?;
        Ok(client.post(full_url).json(&self))
    }
}

impl ApiRequest for AuthRequest {
    type Response = AuthResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/users/auth")?;
        Ok(client.post(full_url).json(&self))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_register_request_shape() {
        let base = Url::parse("http://localhost:8081").unwrap();
        let request = RegisterUserRequest {
            public_key: "cGs=".to_string(),
        }
        .build_request(&base, &Client::new())
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:8081/api/users");
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["public_key"], "cGs=");
    }

    #[test]
    fn test_auth_request_url() {
        let base = Url::parse("http://localhost:8081").unwrap();
        let request = AuthRequest {
            id: "acct".to_string(),
            signature: String::new(),
            challenge: String::new(),
            public_key: String::new(),
        }
        .build_request(&base, &Client::new())
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(request.url().path(), "/api/users/auth");
    }
}
