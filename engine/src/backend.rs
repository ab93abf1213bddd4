//! Persistence backend seam.
//!
//! The engine never touches files or the network. It talks to a durable
//! string-keyed store through a [`Slot`]: one context's handle on one key.
//! A write through a slot marks every *other* slot attached to the same key
//! as externally changed, which is how independent contexts (two windows, two
//! threads) learn that the shared value moved under them.
//!
//! [`MemoryBackend`] is a single-threaded, in-process implementation used by
//! tests and by hosts that keep several contexts in one event loop.

use crate::BackendError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A durable key-value store shared across contexts.
pub trait Backend {
    /// Attach a new context to `key`.
    ///
    /// The returned slot starts without a pending external change.
    fn attach(&self, key: &str) -> Box<dyn Slot>;
}

/// One context's handle on one key of a backend.
pub trait Slot {
    /// The key this slot reads and writes.
    fn key(&self) -> &str;

    /// Read the raw stored value, `None` if the key has never been written.
    fn read(&self) -> Result<Option<String>, BackendError>;

    /// Replace the stored value and signal the other slots on this key.
    fn write(&mut self, value: &str) -> Result<(), BackendError>;

    /// Return whether another context wrote the key since the last call,
    /// clearing the flag.
    fn take_external_change(&mut self) -> bool;
}

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, String>,
    /// Attached slots: slot id -> (key, external change pending)
    slots: HashMap<u64, (String, bool)>,
    next_slot: u64,
    quota: Option<usize>,
}

impl MemoryState {
    fn signal_except(&mut self, writer: Option<u64>, key: &str) -> usize {
        let mut signalled = 0;
        for (id, (slot_key, pending)) in self.slots.iter_mut() {
            if Some(*id) != writer && slot_key == key {
                *pending = true;
                signalled += 1;
            }
        }
        signalled
    }
}

/// In-process backend.
///
/// Clones share the same underlying storage, like two windows sharing one
/// browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    /// Create an empty backend without a size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that rejects values larger than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().quota = Some(bytes);
        backend
    }

    /// Change the size limit of an existing backend.
    pub fn set_quota(&self, bytes: Option<usize>) {
        self.state.borrow_mut().quota = bytes;
    }

    /// Read a raw value without attaching.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.state.borrow().values.get(key).cloned()
    }

    /// Write a raw value from outside any attached context.
    ///
    /// Every slot attached to `key` sees an external change.
    pub fn set_raw(&self, key: &str, value: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        state.values.insert(key.to_string(), value.into());
        state.signal_except(None, key);
    }

    /// Number of slots currently attached.
    pub fn slot_count(&self) -> usize {
        self.state.borrow().slots.len()
    }
}

impl Backend for MemoryBackend {
    fn attach(&self, key: &str) -> Box<dyn Slot> {
        let mut state = self.state.borrow_mut();
        let id = state.next_slot;
        state.next_slot += 1;
        state.slots.insert(id, (key.to_string(), false));

        Box::new(MemorySlot {
            id,
            key: key.to_string(),
            state: Rc::clone(&self.state),
        })
    }
}

/// Slot handed out by [`MemoryBackend`].
#[derive(Debug)]
pub struct MemorySlot {
    id: u64,
    key: String,
    state: Rc<RefCell<MemoryState>>,
}

impl Slot for MemorySlot {
    fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> Result<Option<String>, BackendError> {
        Ok(self.state.borrow().values.get(&self.key).cloned())
    }

    fn write(&mut self, value: &str) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();

        if let Some(limit) = state.quota {
            if value.len() > limit {
                return Err(BackendError::QuotaExceeded {
                    key: self.key.clone(),
                    limit,
                    needed: value.len(),
                });
            }
        }

        state.values.insert(self.key.clone(), value.to_string());
        state.signal_except(Some(self.id), &self.key);
        Ok(())
    }

    fn take_external_change(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        match state.slots.get_mut(&self.id) {
            Some((_, pending)) => std::mem::take(pending),
            None => false,
        }
    }
}

impl Drop for MemorySlot {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.slots.remove(&self.id);
        }
    }
}
