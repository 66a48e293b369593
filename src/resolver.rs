//! Resolution API
//!
//! [`GeoIp`] is the per-context entry point: it owns one lazily-opened
//! database slot per address family and exposes the scalar field operations,
//! the composite summary, and request-header annotation.
//!
//! Resolution never fails the caller. An empty or unparseable address, an
//! address absent from the dataset, and an unopenable database all degrade
//! to the configured fallback text; the distinctions surface only on the
//! diagnostic channel.
//!
//! # Example
//!
//! ```no_run
//! use georesolve::{GeoIp, GeoIpConfig};
//!
//! let geo = GeoIp::new(GeoIpConfig::with_path("/usr/share/GeoIP/GeoLite2-City.mmdb"));
//!
//! // Scalar lookups return the value or the fallback, never an error.
//! println!("country: {}", geo.country_code("8.8.8.8"));
//! println!("lat: {}", geo.latitude("8.8.8.8"));
//!
//! // Header annotation attaches all eight values to a sink.
//! let mut headers: Vec<(String, String)> = Vec::new();
//! geo.set_headers("8.8.8.8", &mut headers);
//! assert_eq!(headers.len(), 8);
//! ```

use crate::config::GeoIpConfig;
use crate::dataset::{GeoDataset, MmdbDataset};
use crate::error::{GeoError, Result};
use crate::handle::{DatabaseSlot, Family};
use crate::headers::{annotate, Annotation, HeaderSink};
use crate::projector::{Field, Projector};
use crate::record::LocationRecord;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens the dataset for one address family.
///
/// The default opener memory-maps the configured database file; a custom
/// opener substitutes any other [`GeoDataset`] source.
pub type DatasetOpener = Box<dyn Fn(Family) -> Result<Arc<dyn GeoDataset>> + Send + Sync>;

/// A geo-IP resolution context.
///
/// Holds one database slot per address family, opened lazily on first use
/// and shared read-only by all concurrent callers afterwards. Dropping the
/// context releases the mappings.
pub struct GeoIp {
    config: GeoIpConfig,
    opener: DatasetOpener,
    v4: DatabaseSlot,
    v6: DatabaseSlot,
}

impl GeoIp {
    /// Create a context resolving against the configured database files
    pub fn new(config: GeoIpConfig) -> Self {
        let v4_path = config.v4_path.clone();
        let v6_path = config.v6_effective().to_path_buf();
        let opener: DatasetOpener = Box::new(move |family| {
            let path: &PathBuf = match family {
                Family::V4 => &v4_path,
                Family::V6 => &v6_path,
            };
            let db = MmdbDataset::open(path)?;
            Ok(Arc::new(db) as Arc<dyn GeoDataset>)
        });
        Self::with_opener(config, opener)
    }

    /// Create a context with a custom dataset source.
    ///
    /// The opener is invoked at most once per family while its slot is
    /// unopened; its result is shared by all subsequent callers.
    pub fn with_opener(config: GeoIpConfig, opener: DatasetOpener) -> Self {
        Self {
            config,
            opener,
            v4: DatabaseSlot::new(),
            v6: DatabaseSlot::new(),
        }
    }

    /// The context's configuration
    pub fn config(&self) -> &GeoIpConfig {
        &self.config
    }

    /// True if the family's database has been opened
    pub fn is_open(&self, family: Family) -> bool {
        self.slot(family).is_open()
    }

    fn slot(&self, family: Family) -> &DatabaseSlot {
        match family {
            Family::V4 => &self.v4,
            Family::V6 => &self.v6,
        }
    }

    fn projector(&self) -> Projector<'_> {
        Projector::new(&self.config.fallback)
    }

    /// Opened dataset for `family`, opening it on first use.
    ///
    /// Any open failure surfaces as `Unavailable`; nothing is cached, so
    /// the next call attempts the open again.
    fn dataset(&self, family: Family) -> Result<Arc<dyn GeoDataset>> {
        self.slot(family)
            .ensure_open(|| (self.opener)(family))
            .map_err(|e| match e {
                GeoError::Unavailable(_) => e,
                other => GeoError::Unavailable(other.to_string()),
            })
    }

    fn lookup_parsed(&self, family: Family, addr: IpAddr) -> Option<LocationRecord> {
        let db = match self.dataset(family) {
            Ok(db) => db,
            Err(e) => {
                warn!(family = %family, error = %e, "unable to load geo database");
                return None;
            }
        };
        let record = db.lookup(addr);
        if record.is_none() {
            debug!(addr = %addr, "no record for address");
        }
        record
    }

    /// Parse caller input, short-circuiting empty or invalid text.
    fn parse_input(ip: &str) -> Option<IpAddr> {
        if ip.is_empty() {
            debug!("no IP to look up");
            return None;
        }
        match ip.parse() {
            Ok(addr) => Some(addr),
            Err(_) => {
                debug!(ip, "not a valid IP address");
                None
            }
        }
    }

    fn resolve_text(&self, ip: &str) -> Option<LocationRecord> {
        let addr = Self::parse_input(ip)?;
        self.lookup_parsed(Family::of(addr), addr)
    }

    /// Resolve an address against the given family's database.
    ///
    /// Empty input short-circuits to `None` without touching the database.
    pub fn resolve(&self, family: Family, ip: &str) -> Option<LocationRecord> {
        let addr = Self::parse_input(ip)?;
        self.lookup_parsed(family, addr)
    }

    /// Resolve a typed address against its own family's database
    pub fn resolve_addr(&self, addr: IpAddr) -> Option<LocationRecord> {
        self.lookup_parsed(Family::of(addr), addr)
    }

    fn project_text(&self, ip: &str, field: Field) -> String {
        let record = self.resolve_text(ip);
        self.projector().project(record.as_ref(), field)
    }

    /// City name for `ip`, or the fallback
    pub fn city(&self, ip: &str) -> String {
        self.project_text(ip, Field::City)
    }

    /// Region/subdivision code for `ip`, or the fallback
    pub fn region_name(&self, ip: &str) -> String {
        self.project_text(ip, Field::Region)
    }

    /// ISO country code for `ip`, or the fallback
    pub fn country_code(&self, ip: &str) -> String {
        self.project_text(ip, Field::CountryCode)
    }

    /// Country name for `ip`, or the fallback
    pub fn country_name(&self, ip: &str) -> String {
        self.project_text(ip, Field::CountryName)
    }

    /// Latitude for `ip` with 6 fractional digits, or the fallback
    pub fn latitude(&self, ip: &str) -> String {
        self.project_text(ip, Field::Latitude)
    }

    /// Longitude for `ip` with 6 fractional digits, or the fallback
    pub fn longitude(&self, ip: &str) -> String {
        self.project_text(ip, Field::Longitude)
    }

    /// Composite one-line annotation for `ip`
    pub fn summary(&self, ip: &str) -> String {
        let record = self.resolve_text(ip);
        self.projector().summary(record.as_ref(), ip)
    }

    /// Typed-address overload of [`city`](Self::city)
    pub fn city_addr(&self, addr: IpAddr) -> String {
        self.city(&addr.to_string())
    }

    /// Typed-address overload of [`region_name`](Self::region_name)
    pub fn region_name_addr(&self, addr: IpAddr) -> String {
        self.region_name(&addr.to_string())
    }

    /// Typed-address overload of [`country_code`](Self::country_code)
    pub fn country_code_addr(&self, addr: IpAddr) -> String {
        self.country_code(&addr.to_string())
    }

    /// Typed-address overload of [`country_name`](Self::country_name)
    pub fn country_name_addr(&self, addr: IpAddr) -> String {
        self.country_name(&addr.to_string())
    }

    /// Typed-address overload of [`latitude`](Self::latitude)
    pub fn latitude_addr(&self, addr: IpAddr) -> String {
        self.latitude(&addr.to_string())
    }

    /// Typed-address overload of [`longitude`](Self::longitude)
    pub fn longitude_addr(&self, addr: IpAddr) -> String {
        self.longitude(&addr.to_string())
    }

    /// Typed-address overload of [`summary`](Self::summary)
    pub fn summary_addr(&self, addr: IpAddr) -> String {
        self.summary(&addr.to_string())
    }

    /// Render one field for `ip` into a caller-supplied fixed buffer.
    ///
    /// Commit-or-fail: on `BufferTooSmall` nothing is written. Only this
    /// single field fails; the request itself is unaffected.
    pub fn project_into(&self, ip: &str, field: Field, buf: &mut [u8]) -> Result<usize> {
        let record = self.resolve_text(ip);
        self.projector().project_into(record.as_ref(), field, buf)
    }

    /// Resolve `ip` and attach all eight header annotations to `sink`.
    ///
    /// Every header is always set; missing data carries the fallback.
    pub fn set_headers(&self, ip: &str, sink: &mut dyn HeaderSink) {
        for annotation in self.headers(ip) {
            sink.set_header(annotation.name, &annotation.value);
        }
    }

    /// Typed-address overload of [`set_headers`](Self::set_headers)
    pub fn set_headers_addr(&self, addr: IpAddr, sink: &mut dyn HeaderSink) {
        self.set_headers(&addr.to_string(), sink)
    }

    /// Resolve `ip` and return all eight header annotations
    pub fn headers(&self, ip: &str) -> [Annotation; 8] {
        let record = self.resolve_text(ip);
        annotate(record.as_ref(), ip, &self.projector())
    }
}

impl fmt::Debug for GeoIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoIp")
            .field("config", &self.config)
            .field("v4", &self.v4)
            .field("v6", &self.v6)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::FALLBACK_UNKNOWN;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TableDataset {
        entries: HashMap<IpAddr, LocationRecord>,
    }

    impl GeoDataset for TableDataset {
        fn lookup(&self, addr: IpAddr) -> Option<LocationRecord> {
            self.entries.get(&addr).cloned()
        }
    }

    fn mountain_view() -> LocationRecord {
        LocationRecord {
            city: Some("Mountain View".to_string()),
            region: Some("CA".to_string()),
            country_code: Some("US".to_string()),
            country_name: Some("United States".to_string()),
            latitude: Some(37.4),
            longitude: Some(-122.1),
        }
    }

    fn table_geoip(fallback: &str) -> GeoIp {
        let config = GeoIpConfig::with_path("/unused").with_fallback(fallback);
        GeoIp::with_opener(
            config,
            Box::new(|_family| {
                let mut entries = HashMap::new();
                entries.insert("8.8.8.8".parse().unwrap(), mountain_view());
                Ok(Arc::new(TableDataset { entries }) as Arc<dyn GeoDataset>)
            }),
        )
    }

    #[test]
    fn test_scalar_operations() {
        let geo = table_geoip("");
        assert_eq!(geo.city("8.8.8.8"), "Mountain View");
        assert_eq!(geo.region_name("8.8.8.8"), "CA");
        assert_eq!(geo.country_code("8.8.8.8"), "US");
        assert_eq!(geo.country_name("8.8.8.8"), "United States");
        assert_eq!(geo.latitude("8.8.8.8"), "37.400000");
        assert_eq!(geo.longitude("8.8.8.8"), "-122.100000");
    }

    #[test]
    fn test_typed_overloads_match_text_operations() {
        let geo = table_geoip("");
        let addr: IpAddr = "8.8.8.8".parse().unwrap();
        assert_eq!(geo.city_addr(addr), geo.city("8.8.8.8"));
        assert_eq!(geo.latitude_addr(addr), geo.latitude("8.8.8.8"));
        assert_eq!(geo.summary_addr(addr), geo.summary("8.8.8.8"));
    }

    #[test]
    fn test_absent_address_falls_back() {
        let geo = table_geoip(FALLBACK_UNKNOWN);
        assert_eq!(geo.city("0.0.0.1"), "Unknown");
        assert_eq!(geo.latitude("0.0.0.1"), "Unknown");
    }

    #[test]
    fn test_empty_input_performs_no_lookup() {
        let opens = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opens);
        let geo = GeoIp::with_opener(
            GeoIpConfig::with_path("/unused"),
            Box::new(move |_family| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(TableDataset {
                    entries: HashMap::new(),
                }) as Arc<dyn GeoDataset>)
            }),
        );

        assert_eq!(geo.city(""), "");
        assert_eq!(geo.resolve(Family::V4, ""), None);
        assert_eq!(opens.load(Ordering::SeqCst), 0);
        assert!(!geo.is_open(Family::V4));
    }

    #[test]
    fn test_unparseable_input_performs_no_lookup() {
        let geo = table_geoip("");
        assert_eq!(geo.city("not-an-address"), "");
        assert!(!geo.is_open(Family::V4));
    }

    #[test]
    fn test_unavailable_database_falls_back() {
        let geo = GeoIp::with_opener(
            GeoIpConfig::with_path("/unused").with_fallback(FALLBACK_UNKNOWN),
            Box::new(|_family| Err(GeoError::Unavailable("missing file".to_string()))),
        );

        assert_eq!(geo.city("8.8.8.8"), "Unknown");
        assert_eq!(geo.resolve_addr("8.8.8.8".parse().unwrap()), None);
        assert!(!geo.is_open(Family::V4));
    }

    #[test]
    fn test_families_use_separate_slots() {
        let geo = table_geoip("");
        let _ = geo.city("8.8.8.8");
        assert!(geo.is_open(Family::V4));
        assert!(!geo.is_open(Family::V6));

        let _ = geo.city("2001:4860:4860::8888");
        assert!(geo.is_open(Family::V6));
    }

    #[test]
    fn test_set_headers_fills_all_eight() {
        let geo = table_geoip("");
        let mut sink: Vec<(String, String)> = Vec::new();
        geo.set_headers("8.8.8.8", &mut sink);
        assert_eq!(sink.len(), 8);
        assert_eq!(sink[0].1, "Mountain View");
        assert_eq!(sink[5].1, "37");
    }

    #[test]
    fn test_project_into_on_context() {
        let geo = table_geoip("");
        let mut buf = [0u8; 16];
        let len = geo
            .project_into("8.8.8.8", Field::Latitude, &mut buf)
            .unwrap();
        assert_eq!(&buf[..len], b"37.400000");

        let mut tiny = [0u8; 4];
        assert!(matches!(
            geo.project_into("8.8.8.8", Field::Latitude, &mut tiny),
            Err(GeoError::BufferTooSmall { .. })
        ));
    }
}
