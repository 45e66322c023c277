//! Error types for GeoTIFF parsing.

use thiserror::Error;

/// Result type for GeoTIFF parser operations.
pub type TiffResult<T> = Result<T, TiffError>;

/// Error types for GeoTIFF parsing.
#[derive(Debug, Error)]
pub enum TiffError {
    /// File ends before a structure we need to read.
    #[error("Truncated file while reading {0}")]
    Truncated(&'static str),

    /// Byte-order mark or magic number is wrong.
    #[error("Not a TIFF file: {0}")]
    InvalidHeader(String),

    /// A tag the baseline requires is absent.
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// A tag is present but its value cannot be used.
    #[error("Invalid value for tag {tag}: {message}")]
    InvalidTag {
        tag: &'static str,
        message: String,
    },

    /// Valid TIFF, but uses a feature this reader does not implement.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Compression scheme outside none/LZW/Deflate.
    #[error("Unsupported compression scheme: {0}")]
    UnsupportedCompression(u16),

    /// A strip or tile failed to decompress.
    #[error("Decompression failed: {0}")]
    Codec(String),

    /// Requested band index past the end of the file's bands.
    #[error("Band {requested} out of range (file has {available} bands)")]
    BandOutOfRange { requested: usize, available: usize },
}
