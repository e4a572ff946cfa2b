//! Bookkeeping for mutations that have not finished yet.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use gameup_protocol::{CatalogItemId, EntryId};

/// What a mutation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PendingKey {
    /// An update or removal of an existing entry.
    Entry(EntryId),
    /// An add of a catalog item (no entry id exists yet).
    Item(CatalogItemId),
}

impl fmt::Display for PendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(id) => write!(f, "entry {id}"),
            Self::Item(id) => write!(f, "item {id}"),
        }
    }
}

/// The set of keys with a mutation outstanding.
#[derive(Debug, Default)]
pub(crate) struct PendingSet {
    keys: Mutex<HashSet<PendingKey>>,
}

impl PendingSet {
    /// Claims `key`, or returns `None` if it is already claimed.
    pub(crate) fn claim(&self, key: PendingKey) -> Option<PendingGuard<'_>> {
        let inserted = self
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
        inserted.then_some(PendingGuard { set: self, key })
    }

    #[cfg(test)]
    fn is_pending(&self, key: PendingKey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
    }
}

/// Drop guard that releases a claimed key.
///
/// The mutation holds this for its whole duration, so the key is released
/// on every exit path: success, error, or the future being dropped
/// mid-request.
#[derive(Debug)]
pub(crate) struct PendingGuard<'a> {
    set: &'a PendingSet,
    key: PendingKey,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.set
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_twice_refused_until_released() {
        let set = PendingSet::default();
        let key = PendingKey::Entry(EntryId(5));

        let guard = set.claim(key).expect("first claim succeeds");
        assert!(set.claim(key).is_none());

        drop(guard);
        assert!(!set.is_pending(key));
        assert!(set.claim(key).is_some());
    }

    #[test]
    fn test_entry_and_item_keys_do_not_collide() {
        let set = PendingSet::default();
        let _entry = set.claim(PendingKey::Entry(EntryId(7))).unwrap();
        assert!(set.claim(PendingKey::Item(CatalogItemId(7))).is_some());
    }
}
