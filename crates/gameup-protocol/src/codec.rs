//! Codec trait and implementations for serializing/deserializing bodies.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The [`ApiClient`](crate::ApiClient) uses one for request and response
//! bodies, and the session layer uses one for what it keeps in storage.
//! Neither cares HOW the bytes are produced, only that something
//! implements [`Codec`].

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between threads (the client is shared
///   by every task that talks to the backend).
/// - `'static` → the codec owns everything it needs, so it can live inside
///   long-lived shared state.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the result doesn't
/// borrow from the input bytes, so the response buffer can be dropped
/// right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the backend's only
/// body format.
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use gameup_protocol::{Codec, GameStatus, JsonCodec, StatusUpdateRequest};
///
/// let codec = JsonCodec;
/// let body = StatusUpdateRequest { status: GameStatus::Completed };
///
/// let bytes = codec.encode(&body).unwrap();
/// assert_eq!(bytes, br#"{"status":"Completed"}"#);
///
/// let decoded: StatusUpdateRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, body);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{CatalogItemSummary, LoginResponse};

    #[test]
    fn test_decode_truncated_body_returns_decode_error() {
        let result: Result<LoginResponse, _> = JsonCodec.decode(br#"{"token":"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_missing_required_field_returns_decode_error() {
        // `name` is required on every catalog item.
        let result: Result<CatalogItemSummary, _> = JsonCodec.decode(br#"{"id":1}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let item: CatalogItemSummary = JsonCodec
            .decode(br#"{"id":1,"name":"Celeste","rating":97.5}"#)
            .unwrap();
        assert_eq!(item.name, "Celeste");
    }
}
