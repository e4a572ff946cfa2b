//! The session store: the single source of truth for "are we signed in?".
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Persisting the token on login and deleting it on logout
//! - Restoring the signed-in state from durable storage at startup
//! - Handing out the current token before each authenticated request
//! - Publishing every state change to subscribers
//!
//! # Sharing
//!
//! One `SessionStore` is created at startup and shared as
//! `Arc<SessionStore<_>>` with every consumer: the library synchronizer,
//! the navigation guard, and anything that renders. Consumers that need to
//! react to changes call [`subscribe`](SessionStore::subscribe) and get a
//! `watch::Receiver`, so no one has to thread "on login" callbacks through
//! the call graph.
//!
//! # Token freshness
//!
//! The token is NOT cached in memory. [`token`](SessionStore::token) reads
//! storage on every call, so a logout through any handle (or another
//! process sharing the same file) is seen by the very next request.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::session::is_well_formed_token;
use crate::{KeyValueStore, SessionError, SessionState};

/// The durable-storage key the token lives under.
pub const TOKEN_KEY: &str = "token";

/// Owns the session token and publishes the derived [`SessionState`].
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ restore() ──→ login(token) ──→ token() ... token() ──→ logout()
///  │            │                               │
///  ▼            ▼                               ▼ (backend says 401)
/// [Restoring] [SignedIn | SignedOut]       invalidate() ──→ [SignedOut]
/// ```
#[derive(Debug)]
pub struct SessionStore<S> {
    /// Where the token is persisted.
    storage: S,

    /// Current state. `watch` keeps only the latest value, which is all a
    /// subscriber needs to re-render.
    state: watch::Sender<SessionState>,

    /// Bumped on every `SignedIn` → `SignedOut` transition.
    sign_outs: AtomicU64,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Creates a store in the `Restoring` state. Call
    /// [`restore`](Self::restore) before rendering anything gated on it.
    pub fn new(storage: S) -> Self {
        let (state, _) = watch::channel(SessionState::Restoring);
        Self {
            storage,
            state,
            sign_outs: AtomicU64::new(0),
        }
    }

    /// Reads durable storage and publishes the result.
    ///
    /// A missing, malformed, or unreadable token yields `SignedOut`; this
    /// never fails.
    pub async fn restore(&self) -> SessionState {
        let next = match self.read_token().await {
            Some(_) => SessionState::SignedIn,
            None => SessionState::SignedOut,
        };
        self.publish(next);
        tracing::debug!(state = ?next, "session restored");
        next
    }

    /// Runs [`restore`](Self::restore) unless it has already run.
    pub async fn ensure_restored(&self) -> SessionState {
        match self.state() {
            SessionState::Restoring => self.restore().await,
            restored => restored,
        }
    }

    /// Persists `token` and marks the session signed in.
    ///
    /// # Errors
    /// - [`SessionError::MalformedToken`]: nothing was stored
    /// - [`SessionError::Storage`]: the write failed; state is unchanged
    pub async fn login(&self, token: &str) -> Result<(), SessionError> {
        if !is_well_formed_token(token) {
            return Err(SessionError::MalformedToken);
        }
        self.storage.set(TOKEN_KEY, token).await?;
        self.publish(SessionState::SignedIn);
        tracing::info!("session opened");
        Ok(())
    }

    /// Deletes the stored token and marks the session signed out.
    ///
    /// The state flips to `SignedOut` even if the delete fails: the user
    /// asked to leave, and the next [`token`](Self::token) read will
    /// still find whatever storage holds.
    ///
    /// # Errors
    /// [`SessionError::Storage`] if the token could not be deleted.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let removed = self.storage.remove(TOKEN_KEY).await;
        self.publish(SessionState::SignedOut);
        tracing::info!("session closed");
        removed.map_err(SessionError::from)
    }

    /// Logs out because the backend rejected the token (401).
    ///
    /// There is no client-side expiry check; this is the only way an
    /// expired token is discovered.
    ///
    /// # Errors
    /// [`SessionError::Storage`] if the rejected token could not be deleted.
    /// The session is signed out either way.
    pub async fn invalidate(&self, reason: &str) -> Result<(), SessionError> {
        tracing::warn!(reason, "session invalidated by backend");
        self.logout().await
    }

    /// Reads the token from storage for an outgoing request.
    ///
    /// Also reconciles the published state with what storage holds, so a
    /// logout made through another handle shows up here as `SignedOut`.
    pub async fn token(&self) -> Option<String> {
        let token = self.read_token().await;
        let observed = if token.is_some() {
            SessionState::SignedIn
        } else {
            SessionState::SignedOut
        };
        if self.state() != observed {
            tracing::debug!(state = ?observed, "session state changed in storage");
            self.publish(observed);
        }
        token
    }

    /// The current state, without touching storage.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Shorthand for `self.state().is_authenticated()`.
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// How many times a signed-in session has ended, by logout, by a 401,
    /// or by the token disappearing from storage.
    ///
    /// `watch` only keeps the latest state, so a sign-out followed by a new
    /// login can be missed by a subscriber that looks later. Anything that
    /// holds per-user data compares this counter with the value it saw
    /// last instead.
    pub fn sign_outs(&self) -> u64 {
        self.sign_outs.load(Ordering::Acquire)
    }

    async fn read_token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY).await {
            Ok(Some(token)) if is_well_formed_token(&token) => Some(token),
            Ok(Some(_)) => {
                tracing::debug!("stored token is malformed, ignoring it");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session storage");
                None
            }
        }
    }

    /// Updates the state, notifying subscribers only on an actual change.
    fn publish(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if *current == SessionState::SignedIn && next == SessionState::SignedOut {
                self.sign_outs.fetch_add(1, Ordering::AcqRel);
            }
            *current = next;
            true
        });
    }
}

// =========================================================================
// Tests
// =========================================================================
