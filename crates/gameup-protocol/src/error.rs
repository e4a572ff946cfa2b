//! Error types for the protocol layer.
//!
//! Two enums live here. [`ProtocolError`] is about bytes: a body that does
//! not encode or decode. [`ApiError`] is about meaning: what a backend reply
//! says about the request, sorted into the cases callers react to
//! differently (log in again, treat as duplicate, treat as stale, retry).

use gameup_transport::TransportError;

/// Errors that can occur while encoding or decoding bodies.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a status
    /// name the client does not know.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value is well-formed but not acceptable, e.g. an unknown
    /// status name typed by a user.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// What went wrong with one call to the backend.
///
/// Status-derived variants carry the server's own error text when the body
/// had one, so it can be shown to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401: the token is missing, expired or invalid, or the credentials
    /// were wrong.
    #[error("unauthorized: {}", .0.as_deref().unwrap_or("no message"))]
    Unauthorized(Option<String>),

    /// 404: the referenced resource does not exist (any more).
    #[error("not found: {}", .0.as_deref().unwrap_or("no message"))]
    NotFound(Option<String>),

    /// 409: the resource already exists.
    #[error("conflict: {}", .0.as_deref().unwrap_or("no message"))]
    Conflict(Option<String>),

    /// 400: the backend rejected the request body.
    #[error("bad request: {}", .0.as_deref().unwrap_or("no message"))]
    BadRequest(Option<String>),

    /// Any other non-2xx status (5xx, 502 from the catalog, ...).
    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response was received but its body was not what we expected.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    /// Sorts a non-2xx status into its variant.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Status { status, message },
        }
    }

    /// The server's error text, if the reply carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::BadRequest(m)
            | Self::Status { message: m, .. } => m.as_deref(),
            Self::Transport(_) | Self::Protocol(_) => None,
        }
    }

    /// Returns `true` for a 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
