//! Shared test utilities for the imagery-api workspace.
//!
//! Provides synthetic GeoTIFF fixtures with predictable band values and
//! a small PNG header probe, so tests can assert on decoded pixels and
//! rendered output without binary files in the repository.

pub mod geotiff;
pub mod probe;

pub use geotiff::{band_sample, malformed_image_bytes, GeoTiffBuilder};
pub use probe::{png_probe, PngHeader};
