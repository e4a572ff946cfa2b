//! Ordering for library fetches.
//!
//! Mutations on different entries may run at the same time, and each one
//! ends with its own `GET /api/library`. Those replies can come back in any
//! order, and an older snapshot landing last would undo a newer one (for
//! example, bring back an entry that was just removed).
//!
//! Every fetch takes a [`FetchTicket`] before it is sent. A reply is applied
//! only if no fetch issued after it has been applied already.

use std::sync::atomic::{AtomicU64, Ordering};

/// A fetch's place in line. Higher was sent later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct FetchTicket(u64);

#[derive(Debug, Default)]
pub(crate) struct FetchOrder {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl FetchOrder {
    /// Takes a ticket for a fetch about to be sent.
    pub(crate) fn issue(&self) -> FetchTicket {
        FetchTicket(self.issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Marks `ticket` applied and returns `true`, unless a later ticket was
    /// applied first.
    ///
    /// Callers run this inside the `watch` update closure, so the check and
    /// the write of the entry list happen together.
    pub(crate) fn admit(&self, ticket: FetchTicket) -> bool {
        self.applied.fetch_max(ticket.0, Ordering::AcqRel) < ticket.0
    }

    /// Makes every reply still in flight stale. Used when the local library
    /// is cleared, so a fetch sent before a logout cannot refill it.
    pub(crate) fn invalidate(&self) {
        let ticket = self.issue();
        self.applied.fetch_max(ticket.0, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_in_order_accepts_each() {
        let order = FetchOrder::default();
        let first = order.issue();
        let second = order.issue();

        assert!(order.admit(first));
        assert!(order.admit(second));
    }

    #[test]
    fn test_admit_older_after_newer_rejected() {
        let order = FetchOrder::default();
        let older = order.issue();
        let newer = order.issue();

        assert!(order.admit(newer));
        assert!(!order.admit(older));
    }

    #[test]
    fn test_admit_same_ticket_twice_rejected() {
        let order = FetchOrder::default();
        let ticket = order.issue();

        assert!(order.admit(ticket));
        assert!(!order.admit(ticket));
    }

    #[test]
    fn test_invalidate_discards_replies_in_flight() {
        let order = FetchOrder::default();
        let before = order.issue();
        order.invalidate();
        let after = order.issue();

        assert!(!order.admit(before));
        assert!(order.admit(after));
    }
}
