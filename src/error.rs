/// Error types for the georesolve library
use std::fmt;

/// Result type alias for geo-IP operations
pub type Result<T> = std::result::Result<T, GeoError>;

/// Main error type for geo-IP operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// I/O errors
    Io(String),

    /// Memory mapping errors
    Mmap(String),

    /// Database format errors
    Format(String),

    /// The database could not be opened; lookups degrade to fallback values
    Unavailable(String),

    /// A rendered value does not fit the caller's fixed output buffer.
    /// Nothing is written in this case.
    BufferTooSmall {
        /// Bytes required, including the terminator
        needed: usize,
        /// Capacity of the destination buffer
        capacity: usize,
    },
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::Io(msg) => write!(f, "I/O error: {}", msg),
            GeoError::Mmap(msg) => write!(f, "Memory mapping error: {}", msg),
            GeoError::Format(msg) => write!(f, "Format error: {}", msg),
            GeoError::Unavailable(msg) => write!(f, "Database unavailable: {}", msg),
            GeoError::BufferTooSmall { needed, capacity } => {
                write!(f, "Buffer too small: need {} bytes, have {}", needed, capacity)
            }
        }
    }
}

impl std::error::Error for GeoError {}

impl From<std::io::Error> for GeoError {
    fn from(err: std::io::Error) -> Self {
        GeoError::Io(err.to_string())
    }
}
