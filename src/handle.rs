//! Per-context database handle lifecycle
//!
//! A context owns one [`DatabaseSlot`] per address family. Slots start
//! unopened and are filled lazily on first use: opening a database means
//! mapping a file, which is expensive, so it must happen at most once per
//! context even when many worker threads race on first access.
//!
//! A failed open stores nothing - the next call attempts the open again.
//! This tolerates a database file that appears after startup, at the cost
//! of re-attempting (and re-logging) on every call while the file is
//! missing.

use crate::dataset::GeoDataset;
use crate::error::Result;
use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, PoisonError, RwLock};

/// IP address family, each resolved against its own dataset slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// IPv4 address space
    V4,
    /// IPv6 address space
    V6,
}

impl Family {
    /// The family an address belongs to
    pub fn of(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// Short name used in diagnostics
    pub fn as_str(self) -> &'static str {
        match self {
            Family::V4 => "ipv4",
            Family::V6 => "ipv6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lazily-initialized slot holding one opened dataset.
///
/// The slot is the single-initialization guard: the fast path is a shared
/// read of the stored handle, the slow path takes the write lock, re-checks,
/// and opens. Concurrent first callers perform exactly one underlying open;
/// all of them observe the same handle.
pub struct DatabaseSlot {
    inner: RwLock<Option<Arc<dyn GeoDataset>>>,
}

impl DatabaseSlot {
    /// Create an unopened slot
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Return the opened dataset, opening it with `open` if necessary.
    ///
    /// On failure nothing is stored and the error is returned; a later call
    /// will attempt the open again.
    pub fn ensure_open<F>(&self, open: F) -> Result<Arc<dyn GeoDataset>>
    where
        F: FnOnce() -> Result<Arc<dyn GeoDataset>>,
    {
        if let Some(db) = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(db));
        }

        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have finished the open while we waited.
        if let Some(db) = slot.as_ref() {
            return Ok(Arc::clone(db));
        }

        let db = open()?;
        *slot = Some(Arc::clone(&db));
        Ok(db)
    }

    /// True if a dataset has been stored
    pub fn is_open(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Default for DatabaseSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DatabaseSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSlot")
            .field("open", &self.is_open())
            .finish()
    }
}
