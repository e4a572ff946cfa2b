//! Backend transport abstraction for Game Up.
//!
//! Provides the [`Backend`] trait: one method that performs a single
//! request/response exchange with the Game Up REST backend. Everything
//! above this crate speaks in [`ApiRequest`] and [`ApiResponse`] and never
//! touches an HTTP library directly.
//!
//! # Feature Flags
//!
//! - `http` (default): [`HttpBackend`], a `reqwest`-based implementation
//! - `mock`: [`ScriptedBackend`], a canned-response double for tests

mod error;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "mock")]
mod mock;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::{HttpBackend, HttpBackendConfig};
#[cfg(feature = "mock")]
pub use mock::ScriptedBackend;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// HTTP methods used by the Game Up backend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// One outgoing request, relative to the backend's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// The HTTP method.
    pub method: Method,
    /// Path relative to the base URL, e.g. `/api/library/7`.
    pub path: String,
    /// Bearer token sent as `Authorization: Bearer <token>`, if any.
    pub bearer: Option<String>,
    /// JSON body, already encoded.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    /// A `GET` request without a body.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// A `POST` request carrying an encoded JSON body.
    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    /// A `PUT` request carrying an encoded JSON body.
    pub fn put(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    /// A `DELETE` request without a body.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attaches an encoded JSON body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches a bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// The raw outcome of an exchange: status code plus body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs request/response exchanges with the backend.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one backend is shared (behind an `Arc`) by
///   the session, library and search layers, and search queries run on
///   spawned tasks.
/// - The returned future is `Send` so it can be driven from any Tokio
///   worker thread.
pub trait Backend: Send + Sync + 'static {
    /// Sends one request and waits for the complete response.
    ///
    /// # Errors
    /// Returns a [`TransportError`] only when no response was received.
    /// Non-2xx statuses come back as `Ok` responses.
    fn execute(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

impl<B: Backend> Backend for Arc<B> {
    fn execute(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        (**self).execute(request)
    }
}
