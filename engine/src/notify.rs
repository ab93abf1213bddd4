//! Change subscribers.

use crate::ItemStore;
use std::fmt;

/// Handle returned by [`ItemStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callback invoked after the collection changed.
pub type Callback = Box<dyn FnMut(&ItemStore)>;

struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
}

/// Ordered list of change subscribers.
#[derive(Default)]
pub(crate) struct Subscribers {
    entries: Vec<Subscriber>,
    next_id: u64,
    /// Entries currently taken out of the store to run
    detached: usize,
}

impl Subscribers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push(Subscriber { id, callback });
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len() + self.detached
    }

    pub(crate) fn set_detached(&mut self, count: usize) {
        self.detached = count;
    }

    /// Call every subscriber in subscription order.
    pub(crate) fn emit(&mut self, store: &ItemStore) {
        for subscriber in self.entries.iter_mut() {
            (subscriber.callback)(store);
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
