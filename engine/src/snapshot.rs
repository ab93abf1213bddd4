//! Persisted form of the collection.
//!
//! The collection is stored as a single JSON array of
//! `{"id", "title", "completed"}` objects, in display order. Snapshots are the
//! bridge between the in-memory store and the backend slot.

use crate::{error::Result, Error, Item};
use std::collections::HashSet;

/// Serialize the collection for writing to a backend.
pub fn encode(items: &[Item]) -> Result<String> {
    serde_json::to_string(items).map_err(|e| Error::Encode(e.to_string()))
}

/// Deserialize a persisted collection.
///
/// All three fields are required on every record; unknown fields are ignored.
pub fn decode(raw: &str) -> Result<Vec<Item>> {
    serde_json::from_str(raw).map_err(|e| Error::InvalidSnapshot(e.to_string()))
}

/// Decode a persisted value without ever failing.
///
/// Absent or malformed blobs yield an empty collection. Records whose id was
/// already seen are dropped so ids stay unique.
pub fn load(key: &str, raw: Option<&str>) -> Vec<Item> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let items = match decode(raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "discarding malformed persisted collection");
            return Vec::new();
        }
    };

    let before = items.len();
    let items = dedup_ids(items);
    if items.len() != before {
        tracing::warn!(
            key = %key,
            dropped = before - items.len(),
            "dropped records with duplicate ids"
        );
    }
    items
}

/// Keep the first record for every id.
fn dedup_ids(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}
