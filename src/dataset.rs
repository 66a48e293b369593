//! Dataset access for memory-mapped geo-IP databases
//!
//! The on-disk format and its search algorithm are an external concern:
//! everything above this module sees only the [`GeoDataset`] trait, whose
//! single operation is "look up an address, get a record or nothing".
//! The production implementation memory-maps a MaxMind-format file and
//! delegates decoding to the `maxminddb` reader.
//!
//! # Example
//!
//! ```no_run
//! use georesolve::MmdbDataset;
//! use georesolve::GeoDataset;
//!
//! let db = MmdbDataset::open("/usr/share/GeoIP/GeoLite2-City.mmdb")?;
//! if let Some(record) = db.lookup("8.8.8.8".parse()?) {
//!     println!("country: {:?}", record.country_code);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{GeoError, Result};
use crate::record::LocationRecord;
use maxminddb::{geoip2, MaxMindDBError, Reader};
use memmap2::Mmap;
use std::fs::File;
use std::net::IpAddr;
use std::path::Path;

/// An opened geo-location dataset.
///
/// Implementations must be shareable across worker threads: once opened, a
/// dataset is read-only and serves unlimited concurrent lookups.
///
/// An address that is absent from the dataset is a normal `None` result,
/// never an error.
pub trait GeoDataset: Send + Sync {
    /// Look up a single address, returning its location record if present
    fn lookup(&self, addr: IpAddr) -> Option<LocationRecord>;
}

/// Storage for dataset bytes - either owned or memory-mapped
enum DatasetStorage {
    Owned(Vec<u8>),
    Mmap(Mmap),
}

impl AsRef<[u8]> for DatasetStorage {
    fn as_ref(&self) -> &[u8] {
        match self {
            DatasetStorage::Owned(v) => v.as_slice(),
            DatasetStorage::Mmap(m) => &m[..],
        }
    }
}

/// A MaxMind-format dataset backed by a memory mapping.
///
/// Opening validates the file's metadata; lookups afterwards are zero-copy
/// reads against the mapping. The mapping is released when the dataset is
/// dropped.
pub struct MmdbDataset {
    reader: Reader<DatasetStorage>,
}

impl MmdbDataset {
    /// Open and memory-map a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, cannot be mapped, or
    /// is not a valid MaxMind database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| GeoError::Io(format!("failed to open {}: {}", path.display(), e)))?;

        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| GeoError::Mmap(format!("failed to map {}: {}", path.display(), e)))?;

        Self::from_storage(DatasetStorage::Mmap(mmap))
    }

    /// Create a dataset from raw bytes (for buffer-backed sources and testing)
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_storage(DatasetStorage::Owned(data))
    }

    fn from_storage(storage: DatasetStorage) -> Result<Self> {
        let reader =
            Reader::from_source(storage).map_err(|e| GeoError::Format(e.to_string()))?;
        Ok(Self { reader })
    }
}

impl GeoDataset for MmdbDataset {
    fn lookup(&self, addr: IpAddr) -> Option<LocationRecord> {
        match self.reader.lookup::<geoip2::City>(addr) {
            Ok(city) => Some(LocationRecord::from(city)),
            Err(MaxMindDBError::AddressNotFoundError(_)) => None,
            Err(e) => {
                // Decode failures for individual addresses degrade to "not
                // found" rather than surfacing to the caller.
                tracing::debug!(addr = %addr, error = %e, "dataset lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_nonexistent_file() {
        let result = MmdbDataset::open("/nonexistent/path/to/GeoLite2-City.mmdb");
        assert!(matches!(result, Err(GeoError::Io(_))));
    }

    #[test]
    fn test_open_invalid_format() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not a maxmind database").unwrap();
        file.flush().unwrap();

        let result = MmdbDataset::open(file.path());
        assert!(matches!(result, Err(GeoError::Format(_))));
    }

    #[test]
    fn test_from_bytes_invalid_format() {
        let result = MmdbDataset::from_bytes(vec![0u8; 64]);
        assert!(matches!(result, Err(GeoError::Format(_))));
    }
}
