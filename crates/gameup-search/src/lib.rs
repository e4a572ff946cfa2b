//! Catalog search for Game Up.
//!
//! Search runs while the user types, which raises two problems:
//!
//! 1. **Too many requests.** Every keystroke would hit the catalog. A
//!    [`Debouncer`] waits until the input has stopped changing for a while
//!    (500 ms by default) before anything is sent.
//! 2. **Stale answers.** Responses can arrive out of order: a slow reply
//!    for "hade" must not overwrite a fast reply for "hades". A
//!    [`SequenceGate`] numbers every query and only the newest number is
//!    allowed to update the results.
//!
//! [`SearchSession`] combines both in a background task and publishes a
//! [`SearchState`] for the UI to render.
//!
//! # Integration
//!
//! ```ignore
//! let search = SearchSession::spawn(api, SearchConfig::default());
//! let mut state = search.subscribe();
//!
//! search.set_query("hades");
//! state.changed().await?;
//! render(&state.borrow());
//! ```

use std::future::{self, Future};
use std::sync::Arc;
use std::time::Duration;

use gameup_protocol::{ApiClient, ApiError, CatalogItemSummary};
use gameup_transport::Backend;
use tokio::time::{self, Instant};

mod session;

pub use session::{SearchSession, SearchState};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for a [`SearchSession`].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How long the input must stay unchanged before a query is sent.
    pub debounce: Duration,
}

impl SearchConfig {
    /// The default quiet period.
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

    /// A config with a custom quiet period.
    pub fn with_debounce(debounce: Duration) -> Self {
        Self { debounce }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::with_debounce(Self::DEFAULT_DEBOUNCE)
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Fires once the input has been quiet for `delay`.
///
/// Every [`poke`](Self::poke) (a change to the input) pushes the deadline
/// out again, so a burst of keystrokes produces a single firing after the
/// last one.
///
/// Designed to sit in a `tokio::select!` loop next to the input channel.
/// [`settled`](Self::settled) is cancel-safe: dropping it before it
/// completes leaves the deadline in place.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Creates a disarmed debouncer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Records a change: (re)starts the quiet period from now.
    pub fn poke(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Disarms without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// `true` while a firing is scheduled.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Completes when the quiet period ends, then disarms. Pends forever
    /// while disarmed.
    pub async fn settled(&mut self) {
        match self.deadline {
            Some(deadline) => {
                time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Sequence gate
// ---------------------------------------------------------------------------

/// A query's place in line. Higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Numbers queries so late answers to old queries can be recognized.
#[derive(Debug, Default)]
pub struct SequenceGate {
    latest: u64,
}

impl SequenceGate {
    /// Creates a gate that has issued nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next ticket. Every ticket issued earlier stops being
    /// current.
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// `true` only for the most recently issued ticket.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

// ---------------------------------------------------------------------------
// Catalog seam
// ---------------------------------------------------------------------------

/// Anything that can answer a catalog search.
///
/// Implemented for [`ApiClient`] (the real backend) and for `Arc<T>`, so a
/// shared client can be handed to a session directly.
pub trait CatalogSearch: Send + Sync + 'static {
    /// Returns the catalog items matching `text`.
    fn search(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<CatalogItemSummary>, ApiError>> + Send;
}

impl<B: Backend> CatalogSearch for ApiClient<B> {
    async fn search(&self, text: &str) -> Result<Vec<CatalogItemSummary>, ApiError> {
        ApiClient::search(self, text).await
    }
}

impl<T: CatalogSearch> CatalogSearch for Arc<T> {
    fn search(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<CatalogItemSummary>, ApiError>> + Send {
        (**self).search(text)
    }
}
