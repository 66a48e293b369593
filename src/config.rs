//! Configuration for database locations and the fallback profile
//!
//! Database paths and the fallback constant are environment inputs resolved
//! by the embedding application before any lookup happens. Defaults follow
//! the conventional MaxMind install location; everything can be overridden
//! programmatically or through `GEORESOLVE_*` environment variables.

use crate::projector::FALLBACK_EMPTY;
use std::env;
use std::path::{Path, PathBuf};

/// Conventional directory for MaxMind databases
pub const DEFAULT_DB_DIR: &str = "/usr/share/GeoIP";

/// Default city-level database file name
pub const DEFAULT_DB_FILE: &str = "GeoLite2-City.mmdb";

/// Environment variable overriding the database directory
pub const ENV_DB_DIR: &str = "GEORESOLVE_DB_DIR";
/// Environment variable overriding the IPv4 database path
pub const ENV_V4_DB: &str = "GEORESOLVE_V4_DB";
/// Environment variable overriding the IPv6 database path
pub const ENV_V6_DB: &str = "GEORESOLVE_V6_DB";
/// Environment variable overriding the fallback constant
pub const ENV_FALLBACK: &str = "GEORESOLVE_FALLBACK";

/// Configuration for a geo-IP resolution context.
///
/// `v6_path` is optional: modern city-level databases carry both address
/// families in one file, so when it is unset the IPv6 slot opens the same
/// path as the IPv4 slot (as its own mapping).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoIpConfig {
    /// Database file for IPv4 lookups
    pub v4_path: PathBuf,
    /// Database file for IPv6 lookups, if separate from `v4_path`
    pub v6_path: Option<PathBuf>,
    /// Text substituted for any missing field or record
    pub fallback: String,
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            v4_path: Path::new(DEFAULT_DB_DIR).join(DEFAULT_DB_FILE),
            v6_path: None,
            fallback: FALLBACK_EMPTY.to_string(),
        }
    }
}

impl GeoIpConfig {
    /// Configuration pointing at a single database file for both families
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            v4_path: path.into(),
            ..Default::default()
        }
    }

    /// Set a separate IPv6 database file
    pub fn with_v6_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.v6_path = Some(path.into());
        self
    }

    /// Set the fallback constant
    pub fn with_fallback<S: Into<String>>(mut self, fallback: S) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Build configuration from `GEORESOLVE_*` environment variables,
    /// falling back to the conventional defaults.
    pub fn from_env() -> Self {
        let dir = env::var(ENV_DB_DIR).unwrap_or_else(|_| DEFAULT_DB_DIR.to_string());
        let v4_path = env::var(ENV_V4_DB)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Path::new(&dir).join(DEFAULT_DB_FILE));
        let v6_path = env::var(ENV_V6_DB).ok().map(PathBuf::from);
        let fallback = env::var(ENV_FALLBACK).unwrap_or_else(|_| FALLBACK_EMPTY.to_string());
        Self {
            v4_path,
            v6_path,
            fallback,
        }
    }

    /// Effective database path for the IPv6 family
    pub fn v6_effective(&self) -> &Path {
        self.v6_path.as_deref().unwrap_or(&self.v4_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = GeoIpConfig::default();
        assert_eq!(
            config.v4_path,
            Path::new("/usr/share/GeoIP/GeoLite2-City.mmdb")
        );
        assert_eq!(config.v6_path, None);
        assert_eq!(config.fallback, "");
    }

    #[test]
    fn test_v6_effective_defaults_to_v4() {
        let config = GeoIpConfig::with_path("/tmp/city.mmdb");
        assert_eq!(config.v6_effective(), Path::new("/tmp/city.mmdb"));

        let config = config.with_v6_path("/tmp/city-v6.mmdb");
        assert_eq!(config.v6_effective(), Path::new("/tmp/city-v6.mmdb"));
    }

    #[test]
    fn test_builder_fallback() {
        let config = GeoIpConfig::default().with_fallback("Unknown");
        assert_eq!(config.fallback, "Unknown");
    }
}
