//! Error types for the library layer.

use gameup_protocol::{ApiError, EntryId};
use gameup_session::SessionError;

/// Errors that can occur during library operations.
///
/// A duplicate add (409) and removing an entry that is already gone (404)
/// are NOT errors; they are reported through
/// [`AddOutcome`](crate::AddOutcome) and [`RemoveOutcome`](crate::RemoveOutcome).
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// No session token, or the backend rejected it. The session has been
    /// signed out; the user must log in again.
    #[error("not signed in")]
    Auth,

    /// The entry no longer exists on the backend. It has been dropped from
    /// the local library.
    #[error("library entry {0} not found")]
    NotFound(EntryId),

    /// Another change to the same entry (or another add of the same
    /// catalog item) has not finished yet.
    #[error("a change to this entry is already in progress")]
    InFlight,

    /// The session could not be updated after the backend rejected it.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The backend could not be reached, or answered with an error.
    /// Retryable.
    #[error(transparent)]
    Api(#[from] ApiError),
}
