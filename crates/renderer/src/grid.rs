//! Per-band numeric transforms over row-major `f32` grids.

/// Fixed brightness gain applied to reflectance bands before normalizing.
const BRIGHTEN_ALPHA: f32 = 0.1;

/// Brightened values are clamped to the 8-bit display range.
const BRIGHTEN_CEIL: f32 = 255.0;

/// Ranges below this are treated as constant bands.
const MIN_RANGE: f32 = 1e-6;

/// Increase brightness on a band: linear scale by a fixed factor,
/// clamped to `0..=255`.
pub fn brighten(band: &[f32]) -> Vec<f32> {
    band.iter()
        .map(|&v| (BRIGHTEN_ALPHA * v).clamp(0.0, BRIGHTEN_CEIL))
        .collect()
}

/// Min-max normalize a band so its minimum maps to 0 and maximum to 1.
///
/// A constant band (max == min, within epsilon) normalizes to all zeros
/// rather than dividing by zero. NaN inputs are ignored when finding the
/// range and pass through unchanged.
pub fn normalize(band: &[f32]) -> Vec<f32> {
    let min = band.iter().copied().fold(f32::INFINITY, f32::min);
    let max = band.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    if !range.is_finite() || range < MIN_RANGE {
        return vec![0.0; band.len()];
    }

    band.iter().map(|&v| (v - min) / range).collect()
}

/// Compute the normalized difference index `(b2 - b1) / (b2 + b1)`
/// elementwise over two equally sized grids.
///
/// Pixels where the ratio is not finite (both inputs zero) are mapped to
/// 0.0, the midpoint of the diverging scale, so they render neutrally
/// and survive bilinear resampling.
pub fn normalized_difference(b2: &[f32], b1: &[f32]) -> Vec<f32> {
    debug_assert_eq!(b2.len(), b1.len());
    b2.iter()
        .zip(b1.iter())
        .map(|(&a, &b)| {
            let v = (a - b) / (a + b);
            if v.is_finite() {
                v
            } else {
                0.0
            }
        })
        .collect()
}

/// Resample grid data to a different resolution using bilinear interpolation.
///
/// # Arguments
/// - `data`: Input grid data (row-major order)
/// - `src_width`: Source grid width
/// - `src_height`: Source grid height
/// - `dst_width`: Destination grid width
/// - `dst_height`: Destination grid height
///
/// # Returns
/// Resampled grid data at the requested resolution
pub fn resample_grid(
    data: &[f32],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f32> {
    if src_width == dst_width && src_height == dst_height {
        // No resampling needed
        return data.to_vec();
    }

    let mut output = vec![0.0f32; dst_width * dst_height];

    let x_ratio = if dst_width > 1 {
        (src_width - 1) as f32 / (dst_width - 1) as f32
    } else {
        0.0
    };
    let y_ratio = if dst_height > 1 {
        (src_height - 1) as f32 / (dst_height - 1) as f32
    } else {
        0.0
    };

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            // Bilinear interpolation
            let x1 = src_x.floor() as usize;
            let y1 = src_y.floor() as usize;
            let x2 = (x1 + 1).min(src_width - 1);
            let y2 = (y1 + 1).min(src_height - 1);

            let dx = src_x - x1 as f32;
            let dy = src_y - y1 as f32;

            // Get the four surrounding values
            let v11 = data.get(y1 * src_width + x1).copied().unwrap_or(0.0);
            let v21 = data.get(y1 * src_width + x2).copied().unwrap_or(0.0);
            let v12 = data.get(y2 * src_width + x1).copied().unwrap_or(0.0);
            let v22 = data.get(y2 * src_width + x2).copied().unwrap_or(0.0);

            // Interpolate
            let v1 = v11 * (1.0 - dx) + v21 * dx;
            let v2 = v12 * (1.0 - dx) + v22 * dx;
            let value = v1 * (1.0 - dy) + v2 * dy;

            output[y * dst_width + x] = value;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brighten_scales_and_clamps() {
        let band = vec![0.0, 100.0, 2550.0, 10000.0, -40.0];
        let out = brighten(&band);
        assert_eq!(out, vec![0.0, 10.0, 255.0, 255.0, 0.0]);
    }

    #[test]
    fn test_normalize_maps_min_max() {
        let out = normalize(&[10.0, 20.0, 30.0]);
        assert_eq!(out, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_constant_band() {
        let out = normalize(&[42.0, 42.0, 42.0]);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normalize_ignores_nan_for_range() {
        let out = normalize(&[0.0, f32::NAN, 10.0]);
        assert_eq!(out[0], 0.0);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 1.0);
    }

    #[test]
    fn test_normalized_difference() {
        let nir = vec![0.8, 0.5, 0.0];
        let red = vec![0.2, 0.5, 0.0];
        let out = normalized_difference(&nir, &red);
        assert!((out[0] - 0.6).abs() < 1e-6);
        assert_eq!(out[1], 0.0);
        // 0/0 is masked to the scale midpoint, not NaN.
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_normalized_difference_range() {
        let nir = vec![1.0, 0.0];
        let red = vec![0.0, 1.0];
        let out = normalized_difference(&nir, &red);
        assert_eq!(out, vec![1.0, -1.0]);
    }

    #[test]
    fn test_resample_identity() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let out = resample_grid(&data, 2, 2, 2, 2);
        assert_eq!(out, data);
    }

    #[test]
    fn test_resample_upscale_corners() {
        // Corner values are preserved by the (n-1)/(m-1) mapping.
        let data = vec![0.0, 1.0, 2.0, 3.0];
        let out = resample_grid(&data, 2, 2, 4, 4);
        assert_eq!(out.len(), 16);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[3], 1.0);
        assert_eq!(out[12], 2.0);
        assert_eq!(out[15], 3.0);
    }

    #[test]
    fn test_resample_downscale() {
        let data: Vec<f32> = (0..64).map(|v| v as f32).collect();
        let out = resample_grid(&data, 8, 8, 2, 2);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[3], 63.0);
    }

    #[test]
    fn test_resample_interpolates_midpoint() {
        let data = vec![0.0, 1.0];
        let out = resample_grid(&data, 2, 1, 3, 1);
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert_eq!(out[2], 1.0);
    }
}
