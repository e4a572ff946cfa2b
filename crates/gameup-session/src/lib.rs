//! Session management for Game Up.
//!
//! This crate owns everything the client remembers between requests:
//!
//! 1. **The session token**: persisted on login, deleted on logout, read
//!    fresh before every authenticated call ([`SessionStore`])
//! 2. **Storage**: where that state lives ([`KeyValueStore`] trait, with
//!    a durable [`FileStore`] and an ephemeral [`MemoryStore`])
//! 3. **The recommendation cache**: the last AI suggestions, kept until
//!    logout ([`RecommendationCache`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Library / Navigation (above)  ← ask "signed in?" and "which token?"
//!     ↕
//! Session Layer (this crate)    ← owns the token and its storage
//!     ↕
//! Protocol Layer (below)        ← provides the codec and wire types
//! ```

mod cache;
mod error;
mod session;
mod storage;
mod store;

pub use cache::{RECOMMENDATIONS_KEY, RecommendationCache};
pub use error::{SessionError, StorageError};
pub use session::{SessionState, is_well_formed_token};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{SessionStore, TOKEN_KEY};
