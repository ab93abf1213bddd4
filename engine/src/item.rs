//! The to-do item record.

use crate::ItemId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Engine-generated identifier, immutable after creation
    pub id: ItemId,
    /// Free-form task text
    pub title: String,
    /// Whether the task is done
    pub completed: bool,
}

impl Item {
    /// Create a new, not yet completed item with a freshly generated id.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(generate_id(), title)
    }

    /// Create an item with a known id.
    ///
    /// Used when rebuilding records from persisted state and in tests.
    pub fn with_id(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }

    /// Check if the item is still open.
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Flip the completed flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Generate a random 128-bit identifier rendered as a hyphenated UUID v4.
pub fn generate_id() -> ItemId {
    Uuid::new_v4().to_string()
}
