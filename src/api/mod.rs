//! Client for the admin REST API
//!
//! Every endpoint answers with the same envelope, `{ code, msg, data }`.
//! [`ApiClient`] sends an [`ApiRequest`] through a [`Transport`], checks the
//! envelope code and decodes `data`. Only `code == "200"` counts as success.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::TokenStore;

pub use http::HttpTransport;

/// The only envelope code that signals success
pub const SUCCESS_CODE: &str = "200";

/// Header carrying the bearer token
pub const TOKEN_HEADER: &str = "token";

/// Failure of a single API operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// An authenticated call was attempted with no stored token
    #[error("未登录")]
    NotLoggedIn,
    /// Network unreachable, timeout, or HTTP-level failure
    #[error("网络错误: {0}")]
    Transport(String),
    /// Response did not match the expected schema
    #[error("响应解析失败: {0}")]
    Decode(String),
    /// Well-formed response with a non-success code
    #[error("{msg}")]
    Server {
        /// Envelope code
        code: String,
        /// Server-supplied message
        msg: String,
    },
}

impl ApiError {
    /// Message for the user: the server's own text, or `prefix: error`
    pub fn user_message(&self, prefix: &str) -> String {
        match self {
            Self::Server { msg, .. } => msg.clone(),
            other => format!("{prefix}: {other}"),
        }
    }
}

/// HTTP method of an [`ApiRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
}

/// A request, independent of the transport that sends it
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path below the base URL, starting with `/`
    pub path: String,
    /// Query parameters in order
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
    /// Bearer token for the `token` header
    pub token: Option<String>,
}

impl ApiRequest {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
            token: None,
        }
    }

    /// GET `path`
    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    /// POST `path`
    pub fn post(path: &str) -> Self {
        Self::new(Method::Post, path)
    }

    /// PUT `path`
    pub fn put(path: &str) -> Self {
        Self::new(Method::Put, path)
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter when `value` is present
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    /// Attach the bearer token
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    /// Look up a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Full URL below `base_url`, with an encoded query string
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        if !self.query.is_empty() {
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }
}

/// Raw request execution, returning the response body
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Send `request` and return the response body text
    async fn send(&self, request: &ApiRequest) -> Result<String, ApiError>;
}

/// A decoded success envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    /// Always [`SUCCESS_CODE`]
    pub code: String,
    /// Server message
    pub msg: String,
    /// Payload
    pub data: T,
}

#[derive(serde::Deserialize)]
struct RawEnvelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Value,
}

/// API client: transport plus the session it reads tokens from
pub struct ApiClient<T> {
    transport: T,
    session: Arc<TokenStore>,
}

impl<T: Transport> ApiClient<T> {
    /// Create a client
    pub const fn new(transport: T, session: Arc<TokenStore>) -> Self {
        Self { transport, session }
    }

    /// The session this client belongs to
    pub const fn session(&self) -> &Arc<TokenStore> {
        &self.session
    }

    /// The underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` and decode a success envelope carrying `D`
    ///
    /// A non-success code becomes [`ApiError::Server`] before `data` is
    /// looked at, so error replies with a missing or odd `data` still
    /// surface the server message.
    pub async fn call<D: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Envelope<D>, ApiError> {
        let raw = self.checked(&request).await?;
        let data =
            serde_json::from_value(raw.data).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(Envelope {
            code: raw.code,
            msg: raw.msg,
            data,
        })
    }

    /// Send an operation that carries no payload, returning the server message
    ///
    /// Whatever the server puts in `data` is ignored.
    pub async fn call_no_data(&self, request: ApiRequest) -> Result<String, ApiError> {
        Ok(self.checked(&request).await?.msg)
    }

    async fn checked(&self, request: &ApiRequest) -> Result<RawEnvelope, ApiError> {
        let body = self.transport.send(request).await?;
        let raw: RawEnvelope =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        if raw.code != SUCCESS_CODE {
            tracing::debug!(path = %request.path, code = %raw.code, "API returned failure code");
            return Err(ApiError::Server {
                code: raw.code,
                msg: raw.msg,
            });
        }
        Ok(raw)
    }
}
