//! HTTP session for the Commerce API
//!
//! Wraps a `reqwest::Client` with the credential headers every call needs and
//! normalizes responses into `StoreResult`s. Requests are sent one at a time
//! and never retried.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::providers::traits::{StoreError, StoreResult};

/// Client identifier header
pub const CLIENT_ID_HEADER: &str = "x-naver-client-id";
/// Client secret header
pub const CLIENT_SECRET_HEADER: &str = "x-naver-client-secret";
/// Gateway trace id, logged for support requests
pub const TRACE_ID_HEADER: &str = "gncp-gw-trace-id";
/// Gateway-measured response time in milliseconds
pub const RESPONSE_TIME_HEADER: &str = "gncp-gw-httpclient-responsetime";

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Authenticated HTTP session bound to one base URL
pub struct ApiSession {
    /// Inner HTTP client
    client: Client,

    /// API base URL without trailing slash
    base_url: String,

    client_id: String,
    client_secret: String,

    /// Bearer token; empty until one has been issued
    access_token: String,

    /// Per-request timeout
    timeout: Duration,
}

impl ApiSession {
    /// Create a new session
    pub fn new(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
        access_token: &str,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("naver-smartstore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Transport)?;

        Ok(ApiSession {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            access_token: access_token.to_string(),
            timeout,
        })
    }

    /// API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer token is attached to requests
    pub fn has_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Replace the bearer token used for subsequent requests
    pub fn set_access_token(&mut self, token: &str) {
        self.access_token = token.to_string();
    }

    /// Full URL for an endpoint path such as `/v1/products`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers attached to every request
    fn headers(&self) -> StoreResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CLIENT_ID_HEADER, header_value("client_id", &self.client_id)?);
        headers.insert(
            CLIENT_SECRET_HEADER,
            header_value("client_secret", &self.client_secret)?,
        );

        if self.has_token() {
            let bearer = format!("Bearer {}", self.access_token);
            headers.insert(AUTHORIZATION, header_value("access_token", &bearer)?);
        }

        Ok(headers)
    }

    /// Send one request and decode the JSON response into `T`.
    ///
    /// An empty body is treated as `{"success": true}`.
    pub async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> StoreResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        info!(method = %method, url = %url, "API request");

        let mut builder = self
            .client
            .request(method, &url)
            .headers(self.headers()?)
            .timeout(self.timeout);

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.send(builder).await.map_err(|e| {
            error!(url = %url, error = %e, "API request failed");
            e
        })
    }

    /// POST a url-encoded form without credential headers (token exchange)
    pub async fn post_form<T, F>(&self, path: &str, form: &F) -> StoreResult<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        let url = self.url(path);
        info!(method = "POST", url = %url, "API request");

        let builder = self.client.post(&url).timeout(self.timeout).form(form);
        self.send(builder).await.map_err(|e| {
            error!(url = %url, error = %e, "API request failed");
            e
        })
    }

    /// Execute a prepared request and normalize the outcome
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> StoreResult<T> {
        let response = builder.send().await?;

        if let Some(trace_id) = header_str(response.headers(), TRACE_ID_HEADER) {
            info!(trace_id = %trace_id, "Trace ID");
        }
        if let Some(elapsed) = header_str(response.headers(), RESPONSE_TIME_HEADER) {
            info!(response_time_ms = %elapsed, "Response time");
        }

        let status = response.status();
        let text = response.text().await?;

        if status.as_u16() >= 400 {
            return Err(StoreError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(status = status.as_u16(), bytes = text.len(), "API response");
        decode_body(&text)
    }
}

/// Decode a response body; empty bodies become `{"success": true}`.
pub fn decode_body<T: DeserializeOwned>(text: &str) -> StoreResult<T> {
    if text.is_empty() {
        return serde_json::from_value(serde_json::json!({ "success": true }))
            .map_err(|e| StoreError::Decode(e.to_string()));
    }

    serde_json::from_str(text).map_err(|e| {
        StoreError::Decode(format!(
            "JSON parse error: {} - Body: {}",
            e,
            preview(text, 500)
        ))
    })
}

fn header_value(name: &str, value: &str) -> StoreResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| StoreError::config(format!("{name} contains characters not allowed in a header")))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
