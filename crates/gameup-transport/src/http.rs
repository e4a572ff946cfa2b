//! HTTP backend implementation using `reqwest`.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};

use crate::{ApiRequest, ApiResponse, Backend, Method, TransportError};

const DEFAULT_USER_AGENT: &str = concat!("gameup-client/", env!("CARGO_PKG_VERSION"));

/// Settings for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Per-request timeout. `None` leaves failures to the transport's own
    /// error channel (connection refused, reset, and so on).
    pub timeout: Option<Duration>,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A [`Backend`] that talks to the REST backend over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// Creates a backend rooted at `base_url` with default settings.
    ///
    /// # Errors
    /// [`TransportError::InvalidUrl`] if `base_url` does not parse, or
    /// [`TransportError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_config(base_url, HttpBackendConfig::default())
    }

    /// Creates a backend rooted at `base_url` with explicit settings.
    pub fn with_config(base_url: &str, config: HttpBackendConfig) -> Result<Self, TransportError> {
        // Request paths are joined onto the base, so the base must end
        // in '/' or its last segment would be replaced.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut builder = Client::builder().user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        tracing::debug!(%base, "HTTP backend configured");
        Ok(Self { client, base })
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))
    }
}

impl Backend for HttpBackend {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated = request.bearer.is_some(),
            "sending request"
        );

        let mut builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        tracing::debug!(status, path = %request.path, "received response");
        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_send_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
