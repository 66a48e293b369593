//! Georesolve - Geo-IP Resolution and Request Annotation
//!
//! Georesolve resolves client IP addresses against MaxMind-format
//! geo-location databases and projects the result into caller-visible
//! string values: city, region, country, coordinates, a one-line summary,
//! and a set of eight named request-header annotations. It is built for
//! reverse proxies and edge services that tag inbound requests with the
//! client's location.
//!
//! # Quick Start
//!
//! ```no_run
//! use georesolve::{GeoIp, GeoIpConfig};
//!
//! let geo = GeoIp::new(GeoIpConfig::with_path("/usr/share/GeoIP/GeoLite2-City.mmdb"));
//!
//! // Scalar lookups: the value, or the configured fallback. Never an error.
//! assert_eq!(geo.country_code("8.8.8.8").len(), 2);
//! println!("{}", geo.latitude("8.8.8.8")); // e.g. "37.400000"
//!
//! // Attach all eight geo headers to a request.
//! let mut headers: Vec<(String, String)> = Vec::new();
//! geo.set_headers("8.8.8.8", &mut headers);
//! ```
//!
//! # Key Properties
//!
//! - **Lazy, race-safe opening**: each address family's database is
//!   memory-mapped on first use, exactly once per context, no matter how
//!   many worker threads arrive at the same time.
//! - **Total projection**: a missing database, a missing record, and a
//!   missing field all render as the configured fallback constant. A
//!   resolution failure is an observability event, not a request failure.
//! - **Shared read-only handles**: after initialization the mapped
//!   database serves unlimited concurrent readers.
//! - **Opaque engine**: the on-disk format belongs to the `maxminddb`
//!   reader; this crate only ever sees "record or not found".
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  GeoIp (one per worker context)             │
//! │   ├─ DatabaseSlot (IPv4) ── mmap ── Reader  │
//! │   └─ DatabaseSlot (IPv6) ── mmap ── Reader  │
//! └─────────────────────────────────────────────┘
//!        resolve(ip) -> Option<LocationRecord>
//!                       ↓
//! ┌─────────────────────────────────────────────┐
//! │  Projector: field -> text (or fallback)     │
//! │  annotate: 8 named header values            │
//! └─────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
/// Configuration for database locations and the fallback profile
pub mod config;
/// Dataset access for memory-mapped geo databases
pub mod dataset;
/// Error types for geo-IP operations
pub mod error;
/// Per-context database handle lifecycle
pub mod handle;
/// Request header annotations
pub mod headers;
/// Field projection and rendering
pub mod projector;
/// Location records produced by lookups
pub mod record;
/// Resolution API
pub mod resolver;

// Re-exports for consumers

/// Per-context resolution API
pub use crate::resolver::{DatasetOpener, GeoIp};

/// Configuration
pub use crate::config::GeoIpConfig;

/// Error handling
pub use crate::error::{GeoError, Result};

/// Lookup results
pub use crate::record::LocationRecord;

/// Address families and handle slots
pub use crate::handle::{DatabaseSlot, Family};

/// Dataset trait and the memory-mapped production implementation
pub use crate::dataset::{GeoDataset, MmdbDataset};

/// Field selection and rendering
pub use crate::projector::{
    Field, Projector, FALLBACK_EMPTY, FALLBACK_UNKNOWN, MAX_RENDERED_LEN,
};

/// Header annotation
pub use crate::headers::{annotate, Annotation, HeaderSink, HEADER_NAMES};

// Version information
/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
