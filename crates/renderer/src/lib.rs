//! Image rendering for satellite raster visualization.
//!
//! Implements the per-band transforms (brighten, normalize, index
//! computation), bilinear resampling to fixed output sizes, diverging
//! color mapping and PNG encoding.

pub mod gradient;
pub mod grid;
pub mod png;
