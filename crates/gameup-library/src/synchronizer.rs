//! The library synchronizer: the local copy of the user's backlog.
//!
//! Every mutation goes to the backend first. Once the backend has accepted
//! it, the whole library is fetched again and replaces the local copy, so
//! the local list always has the server's order and the server's catalog
//! details. If that follow-up fetch fails, the mutation still counts as a
//! success and its known effect is applied to the local list by hand.
//!
//! ```text
//! add / update_status / remove
//!     │
//!     ▼
//! [claim pending key] ──(already claimed)──→ Err(InFlight)
//!     │
//!     ▼
//! backend call ──(401)──→ invalidate session ──→ Err(Auth)
//!     │
//!     ▼
//! re-fetch ──(fails)──→ patch local list + warn
//!     │
//!     ▼
//! publish to subscribers
//! ```

use std::sync::Arc;

use gameup_protocol::{
    AddEntryRequest, AddedEntry, ApiClient, ApiError, CatalogItemId, EntryId, GameStatus,
    LibraryEntry, LibraryStatus,
};
use gameup_session::{KeyValueStore, SessionStore};
use gameup_transport::Backend;
use tokio::sync::watch;

use crate::LibraryError;
use crate::order::{FetchOrder, FetchTicket};
use crate::pending::{PendingGuard, PendingKey, PendingSet};

/// The result of [`LibrarySynchronizer::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The backend created a new entry.
    Added(AddedEntry),
    /// The item was already in the library (409). Nothing was created.
    AlreadyInLibrary,
}

/// The result of [`LibrarySynchronizer::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The backend deleted the entry.
    Removed,
    /// The entry did not exist on the backend (404). Removal is idempotent,
    /// so this is not an error.
    AlreadyGone,
}

/// Keeps a local copy of one user's library in step with the backend.
///
/// The session token is read from the [`SessionStore`] at the start of
/// every operation, never cached here. With no token, operations fail with
/// [`LibraryError::Auth`] before touching the network.
#[derive(Debug)]
pub struct LibrarySynchronizer<B, S> {
    api: Arc<ApiClient<B>>,
    session: Arc<SessionStore<S>>,
    /// The last known library, in server order.
    entries: watch::Sender<Vec<LibraryEntry>>,
    /// Keeps an older fetch from overwriting a newer one.
    order: FetchOrder,
    pending: PendingSet,
}

impl<B: Backend, S: KeyValueStore> LibrarySynchronizer<B, S> {
    /// Creates a synchronizer with an empty local library.
    pub fn new(api: Arc<ApiClient<B>>, session: Arc<SessionStore<S>>) -> Self {
        let (entries, _) = watch::channel(Vec::new());
        Self {
            api,
            session,
            entries,
            order: FetchOrder::default(),
            pending: PendingSet::default(),
        }
    }

    // -- Reads ------------------------------------------------------------

    /// Fetches the library and replaces the local copy with it.
    ///
    /// If a fetch sent later has already been applied, that newer list is
    /// kept and returned instead.
    ///
    /// # Errors
    /// - [`LibraryError::Auth`]: no session, or the token was rejected
    /// - [`LibraryError::Api`]: network or server failure; local state is
    ///   left as it was
    pub async fn fetch(&self) -> Result<Vec<LibraryEntry>, LibraryError> {
        let token = self.token().await?;
        let ticket = self.order.issue();
        let entries = match self.api.library(&token).await {
            Ok(entries) => entries,
            Err(e) => return Err(self.reject(e).await),
        };
        tracing::debug!(count = entries.len(), ?ticket, "library fetched");
        self.apply(ticket, entries);
        Ok(self.entries())
    }

    /// Asks the backend whether `item` is in the library.
    pub async fn status_for(&self, item: CatalogItemId) -> Result<LibraryStatus, LibraryError> {
        let token = self.token().await?;
        match self.api.library_status(&token, item).await {
            Ok(status) => Ok(status),
            Err(e) => Err(self.reject(e).await),
        }
    }

    /// A snapshot of the local library.
    pub fn entries(&self) -> Vec<LibraryEntry> {
        self.entries.borrow().clone()
    }

    /// The local entries with `status`, in server order. One call per tab
    /// of the "my games" view.
    pub fn by_status(&self, status: GameStatus) -> Vec<LibraryEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.status == status)
            .cloned()
            .collect()
    }

    /// The local entry for a catalog item, if there is one.
    pub fn find_by_catalog_item(&self, item: CatalogItemId) -> Option<LibraryEntry> {
        self.entries
            .borrow()
            .iter()
            .find(|entry| entry.catalog_item_id == item)
            .cloned()
    }

    /// Subscribes to changes of the local library.
    pub fn subscribe(&self) -> watch::Receiver<Vec<LibraryEntry>> {
        self.entries.subscribe()
    }

    /// Forgets the local library. Used on logout.
    ///
    /// Fetches still in flight are discarded when they answer.
    pub fn clear(&self) {
        self.order.invalidate();
        self.entries.send_if_modified(|entries| {
            let changed = !entries.is_empty();
            entries.clear();
            changed
        });
    }

    // -- Mutations --------------------------------------------------------

    /// Adds `item` to the library with `status`.
    ///
    /// A 409 from the backend means the item is already there; that is
    /// reported as [`AddOutcome::AlreadyInLibrary`] and no local duplicate
    /// is created.
    ///
    /// # Errors
    /// - [`LibraryError::InFlight`]: an add of the same item is running
    /// - [`LibraryError::Auth`], [`LibraryError::Api`]
    pub async fn add(
        &self,
        item: CatalogItemId,
        status: GameStatus,
    ) -> Result<AddOutcome, LibraryError> {
        let token = self.token().await?;
        let _guard = self.claim(PendingKey::Item(item))?;

        let body = AddEntryRequest {
            catalog_item_id: item,
            status,
        };
        let outcome = match self.api.add_to_library(&token, &body).await {
            Ok(reply) => {
                tracing::info!(%item, entry_id = %reply.game.id, %status, "game added to library");
                AddOutcome::Added(reply.game)
            }
            Err(ApiError::Conflict(_)) => {
                tracing::info!(%item, "game already in library");
                AddOutcome::AlreadyInLibrary
            }
            Err(e) => return Err(self.reject(e).await),
        };

        // The add reply has no catalog details, so there is nothing useful
        // to patch in if the re-fetch fails.
        self.reconcile(&token, |_| {}).await;
        Ok(outcome)
    }

    /// Changes the status of an existing entry and returns the refreshed
    /// entry.
    ///
    /// Returns `Ok(None)` only if the change was accepted but the entry is
    /// not in the local library afterwards (the re-fetch failed and the
    /// entry had never been fetched).
    ///
    /// # Errors
    /// - [`LibraryError::NotFound`]: the entry no longer exists; it has
    ///   been dropped from the local library
    /// - [`LibraryError::InFlight`]: another change to this entry is running
    /// - [`LibraryError::Auth`], [`LibraryError::Api`]
    pub async fn update_status(
        &self,
        entry_id: EntryId,
        status: GameStatus,
    ) -> Result<Option<LibraryEntry>, LibraryError> {
        let token = self.token().await?;
        let _guard = self.claim(PendingKey::Entry(entry_id))?;

        match self.api.update_status(&token, entry_id, status).await {
            Ok(()) => {
                tracing::info!(%entry_id, %status, "library entry updated");
            }
            Err(ApiError::NotFound(_)) => {
                tracing::info!(%entry_id, "library entry vanished, dropping it");
                self.entries
                    .send_modify(|entries| entries.retain(|entry| entry.id != entry_id));
                self.reconcile(&token, |_| {}).await;
                return Err(LibraryError::NotFound(entry_id));
            }
            Err(e) => return Err(self.reject(e).await),
        }

        self.reconcile(&token, |entries| {
            if let Some(entry) = entries.iter_mut().find(|entry| entry.id == entry_id) {
                entry.status = status;
            }
        })
        .await;
        Ok(self
            .entries
            .borrow()
            .iter()
            .find(|entry| entry.id == entry_id)
            .cloned())
    }

    /// Deletes an entry. Deleting one that is already gone succeeds with
    /// [`RemoveOutcome::AlreadyGone`].
    ///
    /// # Errors
    /// - [`LibraryError::InFlight`]: another change to this entry is running
    /// - [`LibraryError::Auth`], [`LibraryError::Api`]
    pub async fn remove(&self, entry_id: EntryId) -> Result<RemoveOutcome, LibraryError> {
        let token = self.token().await?;
        let _guard = self.claim(PendingKey::Entry(entry_id))?;

        let outcome = match self.api.remove_from_library(&token, entry_id).await {
            Ok(()) => {
                tracing::info!(%entry_id, "library entry removed");
                RemoveOutcome::Removed
            }
            Err(ApiError::NotFound(_)) => {
                tracing::debug!(%entry_id, "library entry was already gone");
                RemoveOutcome::AlreadyGone
            }
            Err(e) => return Err(self.reject(e).await),
        };

        self.reconcile(&token, |entries| {
            entries.retain(|entry| entry.id != entry_id);
        })
        .await;
        Ok(outcome)
    }

    // -- Plumbing ---------------------------------------------------------

    async fn token(&self) -> Result<String, LibraryError> {
        self.session.token().await.ok_or(LibraryError::Auth)
    }

    fn claim(&self, key: PendingKey) -> Result<PendingGuard<'_>, LibraryError> {
        self.pending.claim(key).ok_or_else(|| {
            tracing::debug!(%key, "refusing overlapping library change");
            LibraryError::InFlight
        })
    }

    /// Replaces the local library with a fresh fetch, or applies `patch`
    /// to it if the fetch fails.
    async fn reconcile(&self, token: &str, patch: impl FnOnce(&mut Vec<LibraryEntry>)) {
        let ticket = self.order.issue();
        match self.api.library(token).await {
            Ok(entries) => {
                self.apply(ticket, entries);
            }
            Err(e) => {
                tracing::warn!(error = %e, "library re-sync failed, applying change locally");
                self.entries.send_modify(patch);
            }
        }
    }

    /// Replaces the local library with a fetched list, unless a fetch
    /// issued after `ticket` has been applied already.
    fn apply(&self, ticket: FetchTicket, entries: Vec<LibraryEntry>) {
        let applied = self.entries.send_if_modified(|current| {
            if !self.order.admit(ticket) {
                return false;
            }
            *current = entries;
            true
        });
        if !applied {
            tracing::debug!(?ticket, "discarding library fetch older than the one applied");
        }
    }

    /// Turns a failed call into a [`LibraryError`], signing the session out
    /// on a 401.
    async fn reject(&self, error: ApiError) -> LibraryError {
        if !error.is_unauthorized() {
            return LibraryError::Api(error);
        }
        let reason = error.server_message().unwrap_or("token rejected");
        self.clear();
        match self.session.invalidate(reason).await {
            Ok(()) => LibraryError::Auth,
            Err(e) => LibraryError::Session(e),
        }
    }
}
