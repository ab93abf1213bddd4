//! # Todo Engine
//!
//! A persistent, observable store for an ordered list of to-do items.
//!
//! The engine owns the authoritative in-memory collection for one storage key,
//! writes it through to a durable key-value backend on every mutation, notifies
//! subscribers synchronously, and picks up writes made by other contexts (two
//! windows, two threads) sharing the same key.
//!
//! ## Design Principles
//!
//! - **No IO**: persistence is reached only through the [`Backend`] and
//!   [`Slot`] traits
//! - **Write-through**: a mutation is complete only once the whole collection
//!   is persisted; a failed write leaves the store unchanged
//! - **Push-to-pull**: subscribers learn *that* something changed and re-query
//! - **Last writer wins**: an external change replaces the local collection,
//!   and is never written back
//!
//! ## Core Concepts
//!
//! ### Items
//!
//! An [`Item`] has an engine-generated id (random UUID v4), a title and a
//! completed flag. The collection is ordered and the order is persisted.
//!
//! ### Filters
//!
//! [`Filter::All`], [`Filter::Active`] and [`Filter::Completed`] select items
//! by their completed flag while keeping stored order. Unknown filter names
//! resolve to `All`.
//!
//! ### Backends
//!
//! A [`Backend`] hands out one [`Slot`] per context and key. Writing through a
//! slot flags every other slot on the same key; the host calls
//! [`ItemStore::sync_external`] between operations to reload.
//!
//! ## Quick Start
//!
//! ```rust
//! use todo_engine::{Filter, ItemStore, MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//! let mut store = ItemStore::open(&backend, "todos");
//!
//! store.subscribe(|store| {
//!     println!("{} items left", store.active_count());
//! });
//!
//! let milk = store.add("buy milk").unwrap();
//! store.add("walk dog").unwrap();
//! store.toggle(&milk.id).unwrap();
//!
//! assert_eq!(store.query_by_filter(Filter::Active).len(), 1);
//! assert!(store.has_completed());
//!
//! // A second window on the same key sees the persisted state.
//! let other = ItemStore::open(&backend, "todos");
//! assert_eq!(other.items(), store.items());
//! ```
//!
//! ## Persistence
//!
//! The stored value is a JSON array of `{"id", "title", "completed"}` objects;
//! see [`snapshot`]. Absent or malformed values load as an empty collection.

pub mod backend;
pub mod error;
pub mod filter;
pub mod item;
pub mod notify;
pub mod snapshot;
pub mod store;

// Re-export main types at crate root
pub use backend::{Backend, MemoryBackend, MemorySlot, Slot};
pub use error::{BackendError, Error};
pub use filter::Filter;
pub use item::Item;
pub use notify::SubscriptionId;
pub use store::ItemStore;

/// Identifier of an item.
pub type ItemId = String;
