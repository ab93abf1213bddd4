//! ItemStore - the authoritative in-memory collection.
//!
//! Every mutation builds the next collection, writes it through to the
//! backend slot, and only then installs it and notifies subscribers. A failed
//! write leaves the store exactly as it was before the call.

use crate::backend::{Backend, Slot};
use crate::notify::{Subscribers, SubscriptionId};
use crate::{error::Result, snapshot, Error, Filter, Item};
use std::fmt;

/// Owns the ordered collection for one storage key in one context.
pub struct ItemStore {
    slot: Box<dyn Slot>,
    items: Vec<Item>,
    subscribers: Subscribers,
}

impl ItemStore {
    /// Attach to `key` on `backend` and load the persisted collection.
    ///
    /// Loading never fails: an absent, unreadable or malformed value yields an
    /// empty collection.
    pub fn open(backend: &dyn Backend, key: impl Into<String>) -> Self {
        let key = key.into();
        let slot = backend.attach(&key);
        let items = match slot.read() {
            Ok(raw) => snapshot::load(&key, raw.as_deref()),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "initial read failed, starting empty");
                Vec::new()
            }
        };

        tracing::info!(key = %key, items = items.len(), "item store loaded");

        Self {
            slot,
            items,
            subscribers: Subscribers::default(),
        }
    }

    /// The storage key this store persists under.
    pub fn key(&self) -> &str {
        self.slot.key()
    }

    /// All items in stored order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ========================================================================
    // Subscribers
    // ========================================================================

    /// Register a callback invoked after every change.
    ///
    /// Callbacks run synchronously in subscription order and receive the
    /// store so they can re-query it. The store is borrowed immutably for the
    /// duration of the callback, so a subscriber cannot mutate it; queue the
    /// follow-up action and apply it after the triggering call returns.
    ///
    /// ```compile_fail
    /// use todo_engine::{ItemStore, MemoryBackend};
    ///
    /// let backend = MemoryBackend::new();
    /// let mut store = ItemStore::open(&backend, "todos");
    /// store.subscribe(|s: &ItemStore| {
    ///     let _ = s.add("echo");
    /// });
    /// ```
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ItemStore) + 'static,
    {
        self.subscribers.add(Box::new(callback))
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// Number of registered callbacks, including while they are running.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        let mut subscribers = std::mem::take(&mut self.subscribers);
        self.subscribers.set_detached(subscribers.len());
        subscribers.emit(self);
        self.subscribers = subscribers;
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Write `next` through to the backend, then install it and notify.
    fn commit(&mut self, next: Vec<Item>, op: &'static str) -> Result<()> {
        let raw = snapshot::encode(&next)?;

        if let Err(source) = self.slot.write(&raw) {
            tracing::warn!(key = %self.key(), op, error = %source, "persist failed");
            return Err(Error::Persist {
                key: self.key().to_string(),
                source,
            });
        }

        self.items = next;
        tracing::debug!(key = %self.key(), op, items = self.items.len(), "collection persisted");
        self.notify();
        Ok(())
    }

    /// Append a new item with a fresh id.
    ///
    /// The title is stored as given; filtering out blank titles is up to the
    /// caller.
    pub fn add(&mut self, title: impl Into<String>) -> Result<Item> {
        let title = title.into();
        let mut item = Item::new(title.clone());
        while self.get(&item.id).is_some() {
            item = Item::new(title.clone());
        }

        let mut next = self.items.clone();
        next.push(item.clone());
        self.commit(next, "add")?;
        Ok(item)
    }

    /// Remove the item with `id`.
    ///
    /// Persists and notifies even when nothing matched. Returns whether an
    /// item was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let next: Vec<Item> = self.items.iter().filter(|i| i.id != id).cloned().collect();
        let removed = next.len() != self.items.len();
        self.commit(next, "remove")?;
        Ok(removed)
    }

    /// Replace the item sharing `item.id` with `item`.
    ///
    /// An unknown id leaves the collection unchanged but still persists and
    /// notifies. Returns whether a record was replaced.
    pub fn update(&mut self, item: Item) -> Result<bool> {
        let mut replaced = false;
        let next: Vec<Item> = self
            .items
            .iter()
            .map(|old| {
                if old.id == item.id {
                    replaced = true;
                    item.clone()
                } else {
                    old.clone()
                }
            })
            .collect();
        self.commit(next, "update")?;
        Ok(replaced)
    }

    /// Flip the completed flag of the item with `id`.
    ///
    /// Returns whether an item was toggled.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let mut next = self.items.clone();
        let found = match next.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.toggle();
                true
            }
            None => false,
        };
        self.commit(next, "toggle")?;
        Ok(found)
    }

    /// Mark every item completed, or every item active if all are already
    /// completed.
    pub fn toggle_all(&mut self) -> Result<()> {
        let completed = self.is_empty() || !self.has_all_completed();
        let next = self
            .items
            .iter()
            .map(|item| Item {
                completed,
                ..item.clone()
            })
            .collect();
        self.commit(next, "toggle_all")
    }

    /// Remove every completed item. Returns how many were removed.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let next: Vec<Item> = self.items.iter().filter(|i| i.is_active()).cloned().collect();
        let removed = self.items.len() - next.len();
        self.commit(next, "clear_completed")?;
        Ok(removed)
    }

    /// Move the item with `id` to `target_index`.
    ///
    /// The index is interpreted against the collection with the item already
    /// taken out, and is clamped to its end. An unknown id is a no-op that
    /// neither persists nor notifies; the return value tells which happened.
    pub fn reorder(&mut self, id: &str, target_index: usize) -> Result<bool> {
        let Some(current) = self.items.iter().position(|i| i.id == id) else {
            tracing::debug!(key = %self.key(), id, "reorder of unknown id ignored");
            return Ok(false);
        };

        let mut next = self.items.clone();
        let item = next.remove(current);
        let target = target_index.min(next.len());
        next.insert(target, item);
        self.commit(next, "reorder")?;
        Ok(true)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get an item by id.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items passing `filter`, in stored order.
    pub fn query_by_filter(&self, filter: impl Into<Filter>) -> Vec<&Item> {
        let filter = filter.into();
        self.items.iter().filter(|i| filter.matches(i)).collect()
    }

    /// Check if at least one item is completed.
    pub fn has_completed(&self) -> bool {
        self.items.iter().any(|i| i.completed)
    }

    /// Check if every item is completed.
    ///
    /// Vacuously true for an empty collection; use [`ItemStore::is_empty`] to
    /// tell "nothing to do" from "all done".
    pub fn has_all_completed(&self) -> bool {
        self.items.iter().all(|i| i.completed)
    }

    /// Number of items not yet completed.
    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_active()).count()
    }

    // ========================================================================
    // Cross-context reconciliation
    // ========================================================================

    /// Replace the in-memory collection with the persisted one and notify.
    ///
    /// Never writes back, so a concurrent write from another context is not
    /// clobbered. If the backend cannot be read the current collection is
    /// kept and subscribers are not notified. Returns whether the collection
    /// was replaced.
    pub fn reload(&mut self) -> bool {
        let raw = match self.slot.read() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.key(), error = %e, "reload read failed, keeping current items");
                return false;
            }
        };

        self.items = snapshot::load(self.slot.key(), raw.as_deref());
        tracing::info!(key = %self.key(), items = self.items.len(), "reloaded after external change");
        self.notify();
        true
    }

    /// Reload if another context wrote the key since the last check.
    ///
    /// Hosts call this between operations. Returns whether a reload happened.
    pub fn sync_external(&mut self) -> bool {
        self.slot.take_external_change() && self.reload()
    }
}

impl fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemStore")
            .field("key", &self.key())
            .field("items", &self.items)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}
