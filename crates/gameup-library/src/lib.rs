//! Library synchronization for Game Up.
//!
//! A user's library is their backlog: catalog items they own or want, each
//! with a [`GameStatus`](gameup_protocol::GameStatus). This crate keeps a
//! local copy of it that matches the backend after every change.
//!
//! # Key types
//!
//! - [`LibrarySynchronizer`]: fetch / add / update / remove, with
//!   reconciliation and a guard against overlapping changes
//! - [`AddOutcome`], [`RemoveOutcome`]: the non-error results of a
//!   duplicate add and a repeated remove
//! - [`LibraryError`]: everything else that can go wrong

mod error;
mod order;
mod pending;
mod synchronizer;

pub use error::LibraryError;
pub use synchronizer::{AddOutcome, LibrarySynchronizer, RemoveOutcome};
