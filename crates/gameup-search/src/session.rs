//! The search session: a background task that turns keystrokes into
//! results.

use std::sync::Arc;

use gameup_protocol::{ApiError, CatalogItemSummary};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use crate::{CatalogSearch, Debouncer, SearchConfig, SequenceGate, Ticket};

/// Shown when a search fails and the backend gave no message.
const SEARCH_FAILED: &str = "Search failed. Please try again.";

/// What the search box should show right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// The text as typed, updated on every keystroke.
    pub query: String,
    /// Results of the newest query that has answered. Kept while a newer
    /// query is loading.
    pub results: Vec<CatalogItemSummary>,
    /// `true` while the newest query has not answered yet.
    pub loading: bool,
    /// Why the newest query failed, if it did.
    pub error: Option<String>,
}

/// A running search box.
///
/// Feed it keystrokes with [`set_query`](Self::set_query); read the
/// outcome with [`state`](Self::state) or [`subscribe`](Self::subscribe).
/// Dropping the session stops its task and abandons any search still in
/// flight.
#[derive(Debug)]
pub struct SearchSession {
    input: watch::Sender<String>,
    state: watch::Receiver<SearchState>,
    task: JoinHandle<()>,
}

impl SearchSession {
    /// Starts the background task. Must be called inside a Tokio runtime.
    pub fn spawn<C: CatalogSearch>(catalog: C, config: SearchConfig) -> Self {
        let (input, input_rx) = watch::channel(String::new());
        let (state_tx, state) = watch::channel(SearchState::default());
        let task = tokio::spawn(run(Arc::new(catalog), config, input_rx, state_tx));
        Self { input, state, task }
    }

    /// Replaces the search text. Setting the same text again is not a
    /// change and does not restart the debounce timer.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.input.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

type Answer = (Ticket, Result<Vec<CatalogItemSummary>, ApiError>);

async fn run<C: CatalogSearch>(
    catalog: Arc<C>,
    config: SearchConfig,
    mut input: watch::Receiver<String>,
    state: watch::Sender<SearchState>,
) {
    let mut debouncer = Debouncer::new(config.debounce);
    let mut gate = SequenceGate::new();
    // Dropped with this task, which aborts whatever is still running.
    let mut in_flight: JoinSet<Answer> = JoinSet::new();

    loop {
        tokio::select! {
            changed = input.changed() => {
                if changed.is_err() {
                    break;
                }
                let query = input.borrow_and_update().clone();
                state.send_modify(|s| s.query = query);
                debouncer.poke();
            }

            () = debouncer.settled() => {
                let query = state.borrow().query.trim().to_string();
                let ticket = gate.issue();

                if query.is_empty() {
                    state.send_modify(|s| {
                        s.results.clear();
                        s.loading = false;
                        s.error = None;
                    });
                    continue;
                }

                tracing::debug!(%query, ?ticket, "searching catalog");
                state.send_modify(|s| {
                    s.loading = true;
                    s.error = None;
                });
                let catalog = Arc::clone(&catalog);
                in_flight.spawn(async move { (ticket, catalog.search(&query).await) });
            }

            Some(joined) = in_flight.join_next() => {
                let Ok((ticket, result)) = joined else {
                    continue;
                };
                if !gate.is_current(ticket) {
                    tracing::trace!(?ticket, "discarding stale search answer");
                    continue;
                }
                state.send_modify(|s| {
                    s.loading = false;
                    match result {
                        Ok(results) => {
                            s.results = results;
                            s.error = None;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "catalog search failed");
                            s.results.clear();
                            s.error = Some(
                                e.server_message().unwrap_or(SEARCH_FAILED).to_string(),
                            );
                        }
                    }
                });
            }
        }
    }
}
