//! Raster bounding box type.

use serde::{Deserialize, Serialize};

/// Extent of a raster in its native coordinate reference system.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (UTM zones etc.), coordinates are in meters.
/// Field names follow the edge convention (`left` < `right`,
/// `bottom` < `top`) used in the attributes document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterBounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl RasterBounds {
    /// Create a new bounding box from edge coordinates.
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Check if a point is contained within these bounds.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let bounds = RasterBounds::new(600000.0, 5690000.0, 609000.0, 5700000.0);
        assert_eq!(bounds.width(), 9000.0);
        assert_eq!(bounds.height(), 10000.0);
    }

    #[test]
    fn test_contains() {
        let bounds = RasterBounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains(5.0, 5.0));
        assert!(bounds.contains(0.0, 10.0));
        assert!(!bounds.contains(-1.0, 5.0));
        assert!(!bounds.contains(5.0, 11.0));
    }

    #[test]
    fn test_serialize_field_names() {
        let bounds = RasterBounds::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_value(&bounds).unwrap();
        assert_eq!(json["left"], 1.0);
        assert_eq!(json["bottom"], 2.0);
        assert_eq!(json["right"], 3.0);
        assert_eq!(json["top"], 4.0);
    }
}
