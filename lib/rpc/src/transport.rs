//! HTTP transport seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde_json::Value;

use fieldops_core::ClientError;

/// Raw result of one HTTP exchange, decoupled from any HTTP client.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub body: String,
    pub set_cookie: Vec<String>,
}

/// POSTs one JSON document and returns the raw response.
///
/// The client core is written against this trait so tests can script
/// exchanges without a server. See [`crate::testing::MockTransport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        cookie: Option<&str>,
        timeout: Duration,
    ) -> Result<WireResponse, ClientError>;
}

/// Transport backed by reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        cookie: Option<&str>,
        timeout: Duration,
    ) -> Result<WireResponse, ClientError> {
        let mut request = self.client.post(url).json(body).timeout(timeout);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let set_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(WireResponse {
            status,
            body,
            set_cookie,
        })
    }
}
