//! ---
//! ops_section: "05-networking-external-interfaces"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "HTTP client and typed operations for the plant API."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use r_ops_common::config::ApiConfig;

/// Errors surfaced by the plant API client.
///
/// Per-request errors reject that request only; retries are a caller
/// concern and none are implemented here.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure before a status line was obtained.
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    /// Upstream answered outside the 2xx range.
    #[error("api error: status {status}")]
    Status { status: StatusCode },
    /// A 2xx response carried a body that is not valid JSON.
    #[error("malformed response body: {0}")]
    Parse(#[source] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Thin request wrapper around the upstream REST API.
///
/// Every call carries the fixed API key as an `apiKey` query parameter.
/// Endpoint paths are passed without a query string.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        Url::parse(base_url)
            .with_context(|| format!("invalid api base url '{}'", base_url))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.api_key.clone())
    }

    /// Issue `method` against `endpoint`, optionally carrying a JSON body.
    ///
    /// * Non-2xx status → [`ApiError::Status`]; the caller sees a rejected
    ///   operation, never a partial result.
    /// * 2xx with an empty body → `Ok(None)`.
    /// * 2xx with a body → the decoded JSON value; malformed JSON is fatal
    ///   for the call.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> ApiResult<Option<Value>> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%method, endpoint, "issuing api request");

        let mut request = self
            .http
            .request(method, &url)
            .query(&[("apiKey", self.api_key.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status });
        }

        let text = response.text().await.map_err(ApiError::Transport)?;
        if text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text).map(Some).map_err(ApiError::Parse)
    }

    /// GET `endpoint` and decode the body into `T`.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let value = self.request::<()>(endpoint, Method::GET, None).await?;
        decode(value)
    }

    /// Send `body` with `method` and decode the response into `T`.
    pub async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: &B,
    ) -> ApiResult<T> {
        let value = self.request(endpoint, method, Some(body)).await?;
        decode(value)
    }

    /// Fire a body-less command whose response body is irrelevant.
    pub async fn command(&self, endpoint: &str, method: Method) -> ApiResult<()> {
        self.request::<()>(endpoint, method, None).await?;
        Ok(())
    }

    /// Send `body` with `method`, discarding any response body.
    pub async fn command_with_body<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: Method,
        body: &B,
    ) -> ApiResult<()> {
        self.request(endpoint, method, Some(body)).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(value: Option<Value>) -> ApiResult<T> {
    use serde::de::Error as _;
    let value =
        value.ok_or_else(|| ApiError::Parse(serde_json::Error::custom("empty response body")))?;
    serde_json::from_value(value).map_err(ApiError::Parse)
}
