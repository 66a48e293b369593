//! Field projection: from a record (or its absence) to rendered text
//!
//! Projection is a total function. Whatever the lookup produced - no record,
//! a record with the field unset, or a real value - every field renders to a
//! string: the value itself, or the configured fallback constant. No error is
//! ever raised for missing data.
//!
//! Coordinates render in fixed-point with 6 fractional digits, plus a coarse
//! integer-truncated variant. Renderings destined for a caller-supplied fixed
//! buffer are committed whole or not at all: if the value plus terminator
//! does not fit, the call fails with `BufferTooSmall` and the buffer is left
//! untouched.

use crate::error::{GeoError, Result};
use crate::record::LocationRecord;

/// Maximum rendered length for a scalar value committed to a fixed buffer
pub const MAX_RENDERED_LEN: usize = 255;

/// Fallback constant: empty string profile
pub const FALLBACK_EMPTY: &str = "";

/// Fallback constant: "Unknown" profile
pub const FALLBACK_UNKNOWN: &str = "Unknown";

/// Selector for an externally visible record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// City name
    City,
    /// Subdivision/region code
    Region,
    /// ISO country code
    CountryCode,
    /// Country name
    CountryName,
    /// Latitude, 6 fractional digits
    Latitude,
    /// Longitude, 6 fractional digits
    Longitude,
    /// Latitude truncated to a whole degree
    LatitudeCoarse,
    /// Longitude truncated to a whole degree
    LongitudeCoarse,
}

/// Renders record fields as strings with a fixed fallback.
///
/// The fallback constant is configured once and applied uniformly; both the
/// empty-string and `"Unknown"` conventions are in use across deployments,
/// so it is never hard-coded at the use sites.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    fallback: &'a str,
}

impl<'a> Projector<'a> {
    /// Create a projector with the given fallback constant
    pub fn new(fallback: &'a str) -> Self {
        Self { fallback }
    }

    /// The configured fallback constant
    pub fn fallback(&self) -> &str {
        self.fallback
    }

    /// Render one field of `record`, or the fallback if the record or the
    /// field is absent.
    pub fn project(&self, record: Option<&LocationRecord>, field: Field) -> String {
        let value = match field {
            Field::City => record.and_then(|r| r.city.clone()),
            Field::Region => record.and_then(|r| r.region.clone()),
            Field::CountryCode => record.and_then(|r| r.country_code.clone()),
            Field::CountryName => record.and_then(|r| r.country_name.clone()),
            Field::Latitude => record
                .and_then(|r| present(r.latitude))
                .map(format_coordinate),
            Field::Longitude => record
                .and_then(|r| present(r.longitude))
                .map(format_coordinate),
            Field::LatitudeCoarse => record
                .and_then(|r| present(r.latitude))
                .map(format_coarse),
            Field::LongitudeCoarse => record
                .and_then(|r| present(r.longitude))
                .map(format_coarse),
        };
        value.unwrap_or_else(|| self.fallback.to_string())
    }

    /// Render one field into a caller-supplied fixed buffer.
    ///
    /// The rendered value is committed only if it fits, terminator included;
    /// otherwise `BufferTooSmall` is returned and `buf` is not modified.
    /// Returns the committed length, excluding the terminator.
    pub fn project_into(
        &self,
        record: Option<&LocationRecord>,
        field: Field,
        buf: &mut [u8],
    ) -> Result<usize> {
        let value = self.project(record, field);
        commit(&value, buf)
    }

    /// Render the composite one-line annotation.
    ///
    /// Fixed piece order, with the fallback substituted for any missing
    /// field and the caller's IP text appended verbatim.
    pub fn summary(&self, record: Option<&LocationRecord>, ip: &str) -> String {
        format!(
            "city {} region {} country {} lat {} lon {} ip {}",
            self.project(record, Field::City),
            self.project(record, Field::Region),
            self.project(record, Field::CountryCode),
            self.project(record, Field::Latitude),
            self.project(record, Field::Longitude),
            ip
        )
    }
}

/// Coordinate presence check.
///
/// A value of exactly 0.0 is treated as absent, so a location on the
/// equator or prime meridian reports as unknown. Pinned by tests.
fn present(coord: Option<f64>) -> Option<f64> {
    coord.filter(|v| *v != 0.0)
}

/// Fixed-point rendering with 6 fractional digits ("%f"-style)
fn format_coordinate(v: f64) -> String {
    format!("{:.6}", v)
}

/// Whole-degree rendering, truncated toward zero
fn format_coarse(v: f64) -> String {
    format!("{}", v as i64)
}

/// Commit `value` into `buf` whole-or-not-at-all, with a terminating NUL
/// for fixed-buffer callers. Returns the committed length (terminator
/// excluded).
fn commit(value: &str, buf: &mut [u8]) -> Result<usize> {
    let bytes = value.as_bytes();
    let needed = bytes.len() + 1;
    if bytes.len() > MAX_RENDERED_LEN || needed > buf.len() {
        return Err(GeoError::BufferTooSmall {
            needed,
            capacity: buf.len(),
        });
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    buf[bytes.len()] = 0;
    Ok(bytes.len())
}
