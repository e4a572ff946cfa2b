//! Unified error type for the Game Up client.

use gameup_library::LibraryError;
use gameup_protocol::ApiError;
use gameup_session::SessionError;
use gameup_transport::TransportError;

use crate::ValidationErrors;

/// Top-level error for everything the facade does.
///
/// Each variant is a case the UI handles differently: send the user to the
/// login page, show a message under the form, or offer a retry. The
/// `#[from]` conversions let `?` do the sorting.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No session, or the backend rejected the token. The session has been
    /// signed out.
    #[error("not signed in")]
    Auth,

    /// Login was refused (401 from `/login`). The session is unchanged.
    #[error("invalid credentials")]
    InvalidCredentials(Option<String>),

    /// The resource already exists (409), e.g. a taken username.
    #[error("conflict: {}", .0.as_deref().unwrap_or("already exists"))]
    Conflict(Option<String>),

    /// The resource does not exist (404).
    #[error("not found: {}", .0.as_deref().unwrap_or("no message"))]
    NotFound(Option<String>),

    /// The form failed client-side checks. Nothing was sent.
    #[error("invalid form: {0}")]
    Validation(ValidationErrors),

    /// Recommendations need at least one completed game. Nothing was sent.
    #[error("no completed games to base recommendations on")]
    NoCompletedGames,

    /// Another change to the same library entry is still running.
    #[error("a change to this entry is already in progress")]
    Busy,

    /// The backend could not be reached. Retryable.
    #[error("network error: {0}")]
    Network(#[source] TransportError),

    /// The backend answered with an error, or with a body we could not
    /// read.
    #[error("server error: {}", .message.as_deref().unwrap_or("no message"))]
    Server { message: Option<String> },

    /// Session storage failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Text to show the user: the backend's own message when it sent one,
    /// otherwise a fixed fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth => "Please log in again.".to_string(),
            Self::InvalidCredentials(m) => {
                fallback(m.as_deref(), "Login failed. Please try again.")
            }
            Self::Conflict(m) => fallback(m.as_deref(), "That already exists."),
            Self::NotFound(m) => fallback(m.as_deref(), "Not found."),
            Self::Validation(errors) => errors.to_string(),
            Self::NoCompletedGames => {
                "You must complete at least one game to get recommendations.".to_string()
            }
            Self::Busy => "Still saving your last change.".to_string(),
            Self::Network(_) => "Could not reach the server. Please try again.".to_string(),
            Self::Server { message } => {
                fallback(message.as_deref(), "An error occurred. Please try again.")
            }
            Self::Session(_) => "Could not save your session.".to_string(),
        }
    }

    /// `true` when the right reaction is to send the user to the login page.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Auth)
    }
}

fn fallback(message: Option<&str>, default: &str) -> String {
    message.unwrap_or(default).to_string()
}

impl From<ApiError> for ClientError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized(_) => Self::Auth,
            ApiError::NotFound(m) => Self::NotFound(m),
            ApiError::Conflict(m) => Self::Conflict(m),
            ApiError::BadRequest(message) | ApiError::Status { message, .. } => {
                Self::Server { message }
            }
            ApiError::Transport(e) => Self::Network(e),
            ApiError::Protocol(e) => {
                tracing::warn!(error = %e, "unreadable backend reply");
                Self::Server { message: None }
            }
        }
    }
}

impl From<LibraryError> for ClientError {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::Auth => Self::Auth,
            LibraryError::NotFound(_) => Self::NotFound(None),
            LibraryError::InFlight => Self::Busy,
            LibraryError::Session(e) => Self::Session(e),
            LibraryError::Api(e) => e.into(),
        }
    }
}
