//! Location records produced by dataset lookups
//!
//! A [`LocationRecord`] is the structured result of a successful lookup:
//! the handful of fields the annotation layer projects into header values.
//! Every field is optional - a record can exist with some fields unset,
//! which is distinct from the record being absent entirely.

use maxminddb::geoip2;
use serde::Serialize;
use std::collections::BTreeMap;

/// Structured result of a successful geo-IP lookup.
///
/// Records are created per lookup, consumed immediately by the projection
/// layer, and discarded. They are never cached across calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationRecord {
    /// City name (English localization)
    pub city: Option<String>,
    /// Subdivision/region ISO code (e.g. "CA")
    pub region: Option<String>,
    /// ISO 3166-1 country code (e.g. "US")
    pub country_code: Option<String>,
    /// Country name (English localization)
    pub country_name: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    pub longitude: Option<f64>,
}

impl LocationRecord {
    /// True if no field is set at all
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.region.is_none()
            && self.country_code.is_none()
            && self.country_name.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

/// Pick the English localization out of an MMDB names map
fn english(names: Option<BTreeMap<&str, &str>>) -> Option<String> {
    names.and_then(|m| m.get("en").map(|s| (*s).to_string()))
}

impl From<geoip2::City<'_>> for LocationRecord {
    fn from(result: geoip2::City<'_>) -> Self {
        let geoip2::City {
            city,
            country,
            location,
            subdivisions,
            ..
        } = result;

        let (country_code, country_name) = match country {
            Some(country) => (
                country.iso_code.map(str::to_string),
                english(country.names),
            ),
            None => (None, None),
        };

        // The region is the first (most significant) subdivision, by code.
        let region = subdivisions
            .and_then(|mut subs| {
                if subs.is_empty() {
                    None
                } else {
                    Some(subs.remove(0))
                }
            })
            .and_then(|sub| sub.iso_code.map(str::to_string));

        let (latitude, longitude) = match location {
            Some(loc) => (loc.latitude, loc.longitude),
            None => (None, None),
        };

        LocationRecord {
            city: city.and_then(|c| english(c.names)),
            region,
            country_code,
            country_name,
            latitude,
            longitude,
        }
    }
}
