//! Georeferencing tags: pixel scale, tiepoint and GeoKey directory.

use imagery_common::RasterBounds;

use crate::error::{TiffError, TiffResult};
use crate::ifd::{tags, Ifd};
use crate::reader::TiffReader;

/// GeoTIFF key codes read from the GeoKey directory.
const GT_MODEL_TYPE: u16 = 1024;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

/// Marker for "user-defined" codes, which carry no EPSG identity.
const USER_DEFINED: u16 = 32767;

/// Georeferencing extracted from a GeoTIFF directory.
///
/// All fields are optional: a bare TIFF with no geo tags still opens,
/// it just reports pixel-space bounds and no CRS.
#[derive(Debug, Clone, Default)]
pub struct GeoInfo {
    /// ModelPixelScaleTag: model units per pixel in x, y, z.
    pub pixel_scale: Option<[f64; 3]>,
    /// ModelTiepointTag: raster point (i, j, k) pinned to model point (x, y, z).
    pub tiepoint: Option<[f64; 6]>,
    /// EPSG code of the projected or geographic CRS.
    pub epsg: Option<u16>,
}

impl GeoInfo {
    /// Parse georeferencing tags out of an IFD.
    pub fn parse(ifd: &Ifd, reader: &TiffReader) -> TiffResult<Self> {
        let pixel_scale = match ifd.f64_values(reader, tags::MODEL_PIXEL_SCALE)? {
            Some(values) if values.len() >= 3 => Some([values[0], values[1], values[2]]),
            Some(values) => {
                return Err(TiffError::InvalidTag {
                    tag: "ModelPixelScale",
                    message: format!("expected 3 values, got {}", values.len()),
                })
            }
            None => None,
        };

        let tiepoint = match ifd.f64_values(reader, tags::MODEL_TIEPOINT)? {
            Some(values) if values.len() >= 6 => Some([
                values[0], values[1], values[2], values[3], values[4], values[5],
            ]),
            Some(values) => {
                return Err(TiffError::InvalidTag {
                    tag: "ModelTiepoint",
                    message: format!("expected 6 values, got {}", values.len()),
                })
            }
            None => None,
        };

        let epsg = match ifd.u64_values(reader, tags::GEO_KEY_DIRECTORY)? {
            Some(directory) => parse_epsg(&directory),
            None => None,
        };

        Ok(Self {
            pixel_scale,
            tiepoint,
            epsg,
        })
    }

    /// Extent of a `width` x `height` raster in model coordinates.
    ///
    /// Without both geo tags this falls back to pixel space: origin at the
    /// top-left corner, y growing downward, so `top` is 0 and `bottom` is
    /// the row count.
    pub fn bounds(&self, width: usize, height: usize) -> RasterBounds {
        match (self.pixel_scale, self.tiepoint) {
            (Some([sx, sy, _]), Some([i, j, _, x, y, _])) => {
                let left = x - i * sx;
                let top = y + j * sy;
                RasterBounds::new(
                    left,
                    top - height as f64 * sy,
                    left + width as f64 * sx,
                    top,
                )
            }
            _ => RasterBounds::new(0.0, height as f64, width as f64, 0.0),
        }
    }
}

/// Walk the GeoKey directory for a CRS code.
///
/// The directory is a flat array of SHORTs: a 4-value header followed by
/// 4-value key entries (key id, tag location, count, value). Keys whose
/// value lives in another tag (location != 0) cannot hold an EPSG code
/// and are skipped.
fn parse_epsg(directory: &[u64]) -> Option<u16> {
    if directory.len() < 4 {
        return None;
    }
    let key_count = directory[3] as usize;

    let mut geographic = None;
    let mut projected = None;

    for entry in directory[4..].chunks_exact(4).take(key_count) {
        let (key_id, location, value) = (entry[0] as u16, entry[1] as u16, entry[3] as u16);
        if location != 0 || value == USER_DEFINED {
            continue;
        }
        match key_id {
            PROJECTED_CS_TYPE => projected = Some(value),
            GEOGRAPHIC_TYPE => geographic = Some(value),
            GT_MODEL_TYPE => {}
            _ => {}
        }
    }

    // A projected CRS subsumes the geographic key it was derived from.
    projected.or(geographic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epsg_projected() {
        // Header (version 1.1.0, 2 keys), model type, projected CRS.
        let directory = vec![1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32633];
        assert_eq!(parse_epsg(&directory), Some(32633));
    }

    #[test]
    fn test_parse_epsg_geographic() {
        let directory = vec![1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];
        assert_eq!(parse_epsg(&directory), Some(4326));
    }

    #[test]
    fn test_projected_wins_over_geographic() {
        let directory = vec![
            1, 1, 0, 3, 1024, 0, 1, 1, 2048, 0, 1, 4326, 3072, 0, 1, 32633,
        ];
        assert_eq!(parse_epsg(&directory), Some(32633));
    }

    #[test]
    fn test_user_defined_skipped() {
        let directory = vec![1, 1, 0, 1, 3072, 0, 1, 32767];
        assert_eq!(parse_epsg(&directory), None);
    }

    #[test]
    fn test_bounds_from_transform() {
        let geo = GeoInfo {
            pixel_scale: Some([10.0, 10.0, 0.0]),
            tiepoint: Some([0.0, 0.0, 0.0, 600000.0, 5700000.0, 0.0]),
            epsg: Some(32633),
        };
        let bounds = geo.bounds(100, 50);
        assert_eq!(bounds.left, 600000.0);
        assert_eq!(bounds.top, 5700000.0);
        assert_eq!(bounds.right, 601000.0);
        assert_eq!(bounds.bottom, 5699500.0);
    }

    #[test]
    fn test_bounds_pixel_space_fallback() {
        let geo = GeoInfo::default();
        let bounds = geo.bounds(64, 32);
        assert_eq!(bounds.left, 0.0);
        assert_eq!(bounds.top, 0.0);
        assert_eq!(bounds.right, 64.0);
        assert_eq!(bounds.bottom, 32.0);
    }
}
