/// Errors that can occur in the transport layer.
///
/// These only describe failures to complete an HTTP exchange. A response
/// that arrived with a non-2xx status is NOT a transport error; the
/// protocol layer decides what such a status means.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The base URL or request path could not be turned into a URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The backend could not be reached (refused, DNS, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The configured request timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// Building or sending the request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}
