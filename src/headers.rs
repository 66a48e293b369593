//! Request header annotations
//!
//! A resolution fans out into eight named header values attached to the
//! inbound request. Every header is always set: missing fields carry the
//! fallback constant, so downstream consumers never have to distinguish
//! "header absent" from "field unknown".

use crate::projector::{Field, Projector};
use crate::record::LocationRecord;
use serde::Serialize;

/// City name header
pub const HEADER_CITY: &str = "X-Geo-City";
/// Country code header
pub const HEADER_COUNTRY: &str = "X-Geo-Country";
/// Region/subdivision header
pub const HEADER_REGION: &str = "X-Geo-Region";
/// Latitude header, 6 fractional digits
pub const HEADER_LATITUDE: &str = "X-Geo-Latitude";
/// Longitude header, 6 fractional digits
pub const HEADER_LONGITUDE: &str = "X-Geo-Longitude";
/// Latitude header, truncated to a whole degree
pub const HEADER_LATITUDE_COARSE: &str = "X-Geo-Latitude1";
/// Longitude header, truncated to a whole degree
pub const HEADER_LONGITUDE_COARSE: &str = "X-Geo-Longitude1";
/// Composite summary header
pub const HEADER_SUMMARY: &str = "X-Geo-IP";

/// All eight header names, in annotation order
pub const HEADER_NAMES: [&str; 8] = [
    HEADER_CITY,
    HEADER_COUNTRY,
    HEADER_REGION,
    HEADER_LATITUDE,
    HEADER_LONGITUDE,
    HEADER_LATITUDE_COARSE,
    HEADER_LONGITUDE_COARSE,
    HEADER_SUMMARY,
];

/// One named header value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Header name
    pub name: &'static str,
    /// Rendered value (field value or fallback)
    pub value: String,
}

/// Destination for header annotations.
///
/// This is the seam to the host: a request object, a header map, or any
/// other store the embedding application uses for outgoing metadata.
pub trait HeaderSink {
    /// Attach one header to the current request
    fn set_header(&mut self, name: &'static str, value: &str);
}

impl HeaderSink for Vec<(String, String)> {
    fn set_header(&mut self, name: &'static str, value: &str) {
        self.push((name.to_string(), value.to_string()));
    }
}

/// Render all eight annotations for a resolution result.
///
/// `ip` is the caller's address text, echoed into the summary header.
pub fn annotate(
    record: Option<&LocationRecord>,
    ip: &str,
    projector: &Projector<'_>,
) -> [Annotation; 8] {
    let field = |name, f| Annotation {
        name,
        value: projector.project(record, f),
    };
    [
        field(HEADER_CITY, Field::City),
        field(HEADER_COUNTRY, Field::CountryCode),
        field(HEADER_REGION, Field::Region),
        field(HEADER_LATITUDE, Field::Latitude),
        field(HEADER_LONGITUDE, Field::Longitude),
        field(HEADER_LATITUDE_COARSE, Field::LatitudeCoarse),
        field(HEADER_LONGITUDE_COARSE, Field::LongitudeCoarse),
        Annotation {
            name: HEADER_SUMMARY,
            value: projector.summary(record, ip),
        },
    ]
}
