//! Remote API seam
//!
//! The core only sees [`ApiClient::invoke`]. Base URL, cookies and transport
//! live in [`HttpApiClient`].
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::error::ApiError;

pub mod endpoints {
    pub const LOGIN: &str = "login";
    pub const SIGNUP: &str = "signup";
    pub const COMPANIES: &str = "api/v1/companies";
    pub const COURSES: &str = "api/v1/courses";
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Whether session cookies travel with the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Omit,
    Include,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: String,
    pub method: Method,
    pub body: Value,
    pub credentials: Credentials,
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn invoke(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

pub struct HttpApiClient {
    base_url: String,
    // keeps the session cookie between calls
    with_cookies: reqwest::Client,
    without_cookies: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            with_cookies: reqwest::Client::builder().cookie_store(true).build()?,
            without_cookies: reqwest::Client::builder().build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn invoke(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = self.url_for(&request.endpoint);
        let client = match request.credentials {
            Credentials::Include => &self.with_cookies,
            Credentials::Omit => &self.without_cookies,
        };
        let builder = match request.method {
            Method::Get => client.get(&url),
            Method::Post => client.post(&url).json(&request.body),
            Method::Put => client.put(&url).json(&request.body),
            Method::Delete => client.delete(&url),
        };

        debug!(%url, method = ?request.method, "sending request");

        let transport = |e: reqwest::Error| ApiError::Transport {
            endpoint: request.endpoint.clone(),
            reason: e.to_string(),
        };
        let resp = builder.send().await.map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: request.endpoint,
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: request.endpoint,
            reason: e.to_string(),
        })
    }
}
