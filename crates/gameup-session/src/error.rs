//! Error types for the session layer.

use gameup_protocol::ProtocolError;

/// Errors from a [`KeyValueStore`](crate::KeyValueStore).
///
/// A store that cannot be read is reported here; a store whose contents are
/// unreadable (corrupt file) is not an error and simply reads as empty.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or renaming the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage.
    #[error("could not encode stored value: {0}")]
    Encode(#[from] ProtocolError),
}

/// Errors that can occur while managing the session.
///
/// Note what is NOT here: a missing or malformed token found during
/// [`restore`](crate::SessionStore::restore) is not an error. It just
/// means "signed out".
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backend handed us a token that cannot be sent in an
    /// `Authorization` header (empty, whitespace, non-ASCII).
    #[error("malformed session token")]
    MalformedToken,

    /// Durable storage could not be updated.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
