//! Cross-context change bus.
//!
//! Tracks every attached slot and fans out a payload-free "changed" signal to
//! the other slots on the same key whenever one of them writes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

/// Receiving end of a watcher's change signals.
pub type SignalReceiver = mpsc::UnboundedReceiver<()>;

/// Sender for change signals.
type SignalSender = mpsc::UnboundedSender<()>;

/// A single watcher: one context attached to one key.
#[derive(Debug)]
struct Watcher {
    /// Storage key being watched
    key: String,
    /// Channel to signal this watcher
    sender: SignalSender,
}

/// Manages watchers across contexts.
///
/// Thread-safe and can be shared across contexts via `Arc`.
#[derive(Debug, Default)]
pub struct ChangeBus {
    /// All watchers, keyed by watcher ID.
    watchers: DashMap<String, Watcher>,
    /// Index of watcher IDs by storage key.
    by_key: DashMap<String, Vec<String>>,
}

impl ChangeBus {
    /// Create a new change bus.
    pub fn new() -> Self {
        Self {
            watchers: DashMap::new(),
            by_key: DashMap::new(),
        }
    }

    /// Create a new change bus wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a watcher for `key`.
    ///
    /// Returns the watcher ID and the receiver its signals arrive on.
    pub fn register(&self, key: &str) -> (String, SignalReceiver) {
        let watcher_id = uuid::Uuid::new_v4().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();

        self.watchers.insert(
            watcher_id.clone(),
            Watcher {
                key: key.to_string(),
                sender,
            },
        );

        self.by_key
            .entry(key.to_string())
            .or_default()
            .push(watcher_id.clone());

        tracing::debug!(watcher_id = %watcher_id, key = %key, "watcher registered");

        (watcher_id, receiver)
    }

    /// Unregister a watcher.
    pub fn unregister(&self, watcher_id: &str) {
        if let Some((_, watcher)) = self.watchers.remove(watcher_id) {
            if let Some(mut ids) = self.by_key.get_mut(&watcher.key) {
                ids.retain(|id| id != watcher_id);
            }
            // Emptiness is re-checked under the shard lock so a concurrent
            // register on the same key is never dropped.
            self.by_key.remove_if(&watcher.key, |_, ids| ids.is_empty());

            tracing::debug!(watcher_id = %watcher_id, key = %watcher.key, "watcher unregistered");
        }
    }

    /// Signal every watcher of `key` except the writer.
    ///
    /// Returns the number of watchers that were signalled.
    pub fn broadcast_except(&self, writer_id: &str, key: &str) -> usize {
        let ids = match self.by_key.get(key) {
            Some(ids) => ids.clone(),
            None => return 0,
        };

        let mut sent_count = 0;
        for id in ids.iter().filter(|id| id.as_str() != writer_id) {
            if let Some(watcher) = self.watchers.get(id) {
                if watcher.sender.send(()).is_ok() {
                    sent_count += 1;
                }
            }
        }

        tracing::debug!(
            writer = %writer_id,
            key = %key,
            recipients = sent_count,
            "broadcast change signal"
        );

        sent_count
    }

    /// Signal every watcher of `key`.
    ///
    /// Used when the stored value changed outside any attached slot.
    pub fn broadcast_all(&self, key: &str) -> usize {
        self.broadcast_except("", key)
    }

    /// Get the number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Get the number of distinct keys being watched.
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unregister() {
        let bus = ChangeBus::new();

        let (id, _rx) = bus.register("todos");
        assert_eq!(bus.watcher_count(), 1);
        assert_eq!(bus.key_count(), 1);

        bus.unregister(&id);
        assert_eq!(bus.watcher_count(), 0);
        assert_eq!(bus.key_count(), 0);
    }

    #[test]
    fn test_broadcast_except() {
        let bus = ChangeBus::new();

        let (writer, mut rx1) = bus.register("todos");
        let (_peer, mut rx2) = bus.register("todos");
        let (_other, mut rx3) = bus.register("notes");

        let sent = bus.broadcast_except(&writer, "todos");
        assert_eq!(sent, 1);

        // Writer and other keys are not signalled
        assert!(rx1.try_recv().is_err());
        assert!(rx3.try_recv().is_err());

        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_all() {
        let bus = ChangeBus::new();
        let (_a, mut rx1) = bus.register("todos");
        let (_b, mut rx2) = bus.register("todos");

        assert_eq!(bus.broadcast_all("todos"), 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert_eq!(bus.broadcast_all("unknown"), 0);
    }

    #[test]
    fn test_concurrent_register_unregister_keeps_index() {
        let bus = ChangeBus::new_shared();
        let threads = 8;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let bus = Arc::clone(&bus);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let (id, _rx) = bus.register("todos");
                        bus.unregister(&id);
                    }
                    let (_id, rx) = bus.register("todos");
                    rx
                })
            })
            .collect();

        let mut receivers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(bus.watcher_count(), threads);
        assert_eq!(bus.broadcast_all("todos"), threads);
        assert!(receivers.iter_mut().all(|rx| rx.try_recv().is_ok()));
    }

    #[test]
    fn test_closed_receiver_is_not_counted() {
        let bus = ChangeBus::new();
        let (writer, _rx1) = bus.register("todos");
        let (_peer, rx2) = bus.register("todos");
        drop(rx2);

        assert_eq!(bus.broadcast_except(&writer, "todos"), 0);
    }
}
