//! Bookkeeping for cancellable in-flight requests.
//!
//! Each request key (the nearby lookup, or one station's departures) has at
//! most one live request. Starting a new one aborts its predecessor in the
//! same step, and a finishing request only commits if it is still the one
//! registered for its key.

use std::collections::HashMap;
use std::hash::Hash;

use futures::future::{AbortHandle, AbortRegistration};

/// Identifies one request for its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Slot {
    ticket: Ticket,
    handle: AbortHandle,
}

/// Live requests by key.
#[derive(Debug)]
pub struct InFlight<K> {
    next: u64,
    slots: HashMap<K, Slot>,
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            next: 0,
            slots: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> InFlight<K> {
    /// Register a new request for `key`, aborting any previous one.
    ///
    /// The returned registration must be used to wrap the request future.
    pub fn begin(&mut self, key: K) -> (Ticket, AbortRegistration) {
        let (handle, registration) = AbortHandle::new_pair();
        let ticket = Ticket(self.next);
        self.next += 1;

        if let Some(previous) = self.slots.insert(key, Slot { ticket, handle }) {
            previous.handle.abort();
        }

        (ticket, registration)
    }

    /// Retire a finished request.
    ///
    /// Returns true if `ticket` was still the live request for `key`, in
    /// which case its result may be applied. Returns false if it has been
    /// superseded or cleared.
    pub fn finish(&mut self, key: &K, ticket: Ticket) -> bool {
        match self.slots.get(key) {
            Some(slot) if slot.ticket == ticket => {
                self.slots.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Whether a request is live for `key`.
    pub fn is_live(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of live requests.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Abort and forget every live request.
    ///
    /// Ticket numbering continues, so a late finisher can never match a
    /// request started afterwards.
    pub fn abort_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.handle.abort();
        }
    }
}
