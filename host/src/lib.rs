//! # Todo Host
//!
//! Runtime wiring for [`todo_engine`]: a file-backed persistence backend, the
//! in-process change bus that delivers cross-context signals, environment
//! configuration and tracing setup.
//!
//! A UI layer owns one [`ItemStore`] per window and passes it explicitly to
//! its rendering and event code:
//!
//! ```no_run
//! use todo_host::{logging, open_store, Config};
//!
//! logging::init(logging::DEFAULT_DIRECTIVE);
//! let config = Config::load()?;
//! let (backend, mut store) = open_store(&config)?;
//!
//! store.subscribe(|store| {
//!     println!("{} items left", store.active_count());
//! });
//! store.add("buy milk")?;
//!
//! // Between UI events, pick up writes from other windows.
//! store.sync_external();
//! # drop(backend);
//! # Ok::<(), todo_host::HostError>(())
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod file_backend;
pub mod logging;

pub use bus::ChangeBus;
pub use config::{Config, ConfigError};
pub use error::{HostError, Result};
pub use file_backend::{FileBackend, FileSlot};
pub use todo_engine::ItemStore;

/// Create the file backend described by `config` and open its store.
///
/// Further windows on the same data are opened with
/// `ItemStore::open(&backend, key)` so they share the backend's change bus.
pub fn open_store(config: &Config) -> Result<(FileBackend, ItemStore)> {
    let backend = FileBackend::from_config(config)?;
    let store = ItemStore::open(&backend, config.storage_key.as_str());
    tracing::info!(
        key = %config.storage_key,
        dir = %backend.dir().display(),
        items = store.len(),
        "store opened"
    );
    Ok((backend, store))
}
