//! Mask luminance.
//!
//! Masks are ordinary batches that are only read for their brightness.

use ndarray::{Array2, ArrayView3, Axis};

/// Perceptual weights for R, G and B.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Per-pixel luminance of one `[row, col, channel]` item.
///
/// Three-channel items use the weighted sum of [`LUMA_WEIGHTS`]; any other
/// channel count reads channel 0 directly.
pub fn luminance(item: ArrayView3<'_, f32>) -> Array2<f32> {
    if item.len_of(Axis(2)) == 3 {
        item.map_axis(Axis(2), |px| {
            LUMA_WEIGHTS[0] * px[0] + LUMA_WEIGHTS[1] * px[1] + LUMA_WEIGHTS[2] * px[2]
        })
    } else {
        item.index_axis(Axis(2), 0).to_owned()
    }
}

/// Spatial mean of [`luminance`]. An item with no pixels has mean 0.
pub fn mean_luminance(item: ArrayView3<'_, f32>) -> f64 {
    let (height, width, channels) = item.dim();
    if height == 0 || width == 0 || channels == 0 {
        return 0.0;
    }
    let luma = luminance(item);
    let sum: f64 = luma.iter().map(|&v| f64::from(v)).sum();
    sum / luma.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_rgb_weights() {
        let mut item = Array3::<f32>::zeros((1, 3, 3));
        item[[0, 0, 0]] = 1.0;
        item[[0, 1, 1]] = 1.0;
        item[[0, 2, 2]] = 1.0;
        let luma = luminance(item.view());
        assert!((luma[[0, 0]] - 0.299).abs() < 1e-6);
        assert!((luma[[0, 1]] - 0.587).abs() < 1e-6);
        assert!((luma[[0, 2]] - 0.114).abs() < 1e-6);
    }

    #[test]
    fn test_white_is_one() {
        let item = Array3::<f32>::ones((4, 4, 3));
        assert!((mean_luminance(item.view()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_channel_is_direct() {
        let item = Array3::from_shape_fn((2, 2, 1), |(y, _, _)| y as f32);
        assert!((mean_luminance(item.view()) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rgba_reads_first_channel() {
        let item = Array3::from_shape_fn((2, 2, 4), |(_, _, c)| if c == 0 { 0.25 } else { 1.0 });
        assert!((mean_luminance(item.view()) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_item() {
        let item = Array3::<f32>::zeros((0, 4, 3));
        assert_eq!(mean_luminance(item.view()), 0.0);
    }
}
