//! reqwest-backed transport

use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

use super::{ApiError, ApiRequest, Method, TOKEN_HEADER, Transport};
use crate::config::Config;

/// HTTP transport against a fixed base URL
///
/// The underlying [`Client`] is built on first use and reused for every
/// later request, so connections are kept alive between calls.
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    client: OnceLock<Client>,
}

impl HttpTransport {
    /// Create a transport for `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: OnceLock::new(),
        }
    }

    /// Create a transport from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url, config.request_timeout())
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn client(&self) -> &Client {
        self.client.get_or_init(|| {
            Client::builder()
                .timeout(self.timeout)
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!("Falling back to default HTTP client: {e}");
                    Client::new()
                })
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let url = request.url(&self.base_url);
        tracing::debug!(method = ?request.method, %url, "Sending request");

        let client = self.client();
        let mut builder = match request.method {
            Method::Get => client.get(&url),
            Method::Post => client.post(&url),
            Method::Put => client.put(&url),
        };
        if let Some(token) = &request.token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder.header(reqwest::header::CONTENT_TYPE, "application/json"),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        // Error statuses still carry an envelope on this API; only an empty
        // body is a transport failure.
        if !status.is_success() && body.trim().is_empty() {
            return Err(ApiError::Transport(format!("HTTP {status}")));
        }

        Ok(body)
    }
}
