//! File-backed persistence.
//!
//! Each storage key maps to `<data_dir>/<sanitized key>.json`. Writes go to a
//! temporary file that is then renamed over the target, so readers never see
//! a half-written collection.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use todo_engine::{Backend, BackendError, Slot};
use tokio::sync::mpsc::error::TryRecvError;

use crate::bus::{ChangeBus, SignalReceiver};
use crate::config::Config;

/// Backend storing one JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota: Option<usize>,
    bus: Arc<ChangeBus>,
}

impl FileBackend {
    /// Create a backend rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>, bus: Arc<ChangeBus>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "file backend ready");
        Ok(Self {
            dir,
            quota: None,
            bus,
        })
    }

    /// Create a backend from host configuration with a fresh change bus.
    pub fn from_config(config: &Config) -> io::Result<Self> {
        Ok(Self::new(&config.data_dir, ChangeBus::new_shared())?.with_quota(config.quota_bytes))
    }

    /// Limit the size of persisted values.
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// The directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The bus shared by every slot of this backend.
    pub fn bus(&self) -> &Arc<ChangeBus> {
        &self.bus
    }

    /// Tell every slot on `key` that its file changed outside this backend,
    /// for instance after another process or a sync tool replaced it.
    ///
    /// Returns the number of slots signalled.
    pub fn signal_external_change(&self, key: &str) -> usize {
        self.bus.broadcast_all(key)
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl Backend for FileBackend {
    fn attach(&self, key: &str) -> Box<dyn Slot> {
        let (watcher_id, signals) = self.bus.register(key);
        Box::new(FileSlot {
            key: key.to_string(),
            path: self.path_for(key),
            quota: self.quota,
            bus: Arc::clone(&self.bus),
            watcher_id,
            signals,
        })
    }
}

/// One context's handle on one key file.
#[derive(Debug)]
pub struct FileSlot {
    key: String,
    path: PathBuf,
    quota: Option<usize>,
    bus: Arc<ChangeBus>,
    watcher_id: String,
    signals: SignalReceiver,
}

impl FileSlot {
    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, value: &str) -> io::Result<()> {
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", self.watcher_id));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
    }
}

impl Slot for FileSlot {
    fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> Result<Option<String>, BackendError> {
        // Non-UTF-8 content is passed on as text so it fails to parse like
        // any other corrupt value instead of looking like an io error.
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Io(e.to_string())),
        }
    }

    fn write(&mut self, value: &str) -> Result<(), BackendError> {
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(BackendError::QuotaExceeded {
                    key: self.key.clone(),
                    limit,
                    needed: value.len(),
                });
            }
        }

        self.write_atomic(value)
            .map_err(|e| BackendError::Io(e.to_string()))?;
        self.bus.broadcast_except(&self.watcher_id, &self.key);
        Ok(())
    }

    fn take_external_change(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.signals.try_recv() {
                Ok(()) => changed = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }
}

impl Drop for FileSlot {
    fn drop(&mut self) {
        self.bus.unregister(&self.watcher_id);
    }
}

/// Map a storage key to a safe file stem.
pub fn sanitize_key(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Keep keys like "." or ".." from naming directories
    if stem.chars().all(|c| c == '.') {
        stem.replace('.', "_")
    } else {
        stem
    }
}
