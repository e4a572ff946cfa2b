//! Session types: what the client knows about being signed in.
//!
//! The session itself is just a bearer token kept in durable storage. What
//! the rest of the client observes is the derived [`SessionState`].

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Whether the client currently holds a usable token.
///
/// ```text
///   Restoring ──(restore: token found)──→ SignedIn
///       │                                    │  ↑
///       └──(restore: none/malformed)──→ SignedOut
///                                        (login / logout / 401)
/// ```
///
/// - **Restoring**: storage has not been read yet. Nothing should be
///   rendered behind the login gate in this state; doing so would flash
///   protected content at a signed-out user (or hide it from a signed-in
///   one) for a moment.
/// - **SignedOut**: no usable token. "Never logged in" and "token expired"
///   look the same here; the client only learns about expiry when the
///   backend answers 401.
/// - **SignedIn**: a well-formed token is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Restoring,
    SignedOut,
    SignedIn,
}

impl SessionState {
    /// Only `SignedIn` counts as authenticated; `Restoring` does not.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn)
    }

    /// Returns `true` once storage has been read at least once.
    pub fn is_restored(&self) -> bool {
        !matches!(self, Self::Restoring)
    }
}

/// Returns `true` if `token` can be sent as `Authorization: Bearer <token>`.
///
/// The client never inspects what is inside a token; it only refuses
/// values that could not travel in a header at all.
pub fn is_well_formed_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_graphic())
}
