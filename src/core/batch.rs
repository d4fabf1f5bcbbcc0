//! Image batches.
//!
//! A batch is a single 4-D `f32` array indexed `[item, row, col, channel]`
//! with values normalized to `[0, 1]`. Every item shares the same
//! height, width and channel count, and the leading dimension may be zero:
//! an empty batch still knows the shape of the items it would hold.

use crate::core::error::BatchError;
use crate::core::types::Color;
use image::{DynamicImage, RgbImage, RgbaImage};
use ndarray::{s, Array4, ArrayView3, Axis};

/// Number of channels in an RGB batch.
pub const RGB_CHANNELS: usize = 3;

/// An ordered batch of equally shaped images.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    data: Array4<f32>,
}

impl ImageBatch {
    /// Wrap an existing `[item, row, col, channel]` array.
    pub fn new(data: Array4<f32>) -> Self {
        Self { data }
    }

    /// Create a zero-length batch with the given item shape.
    pub fn empty(height: usize, width: usize, channels: usize) -> Self {
        Self {
            data: Array4::zeros((0, height, width, channels)),
        }
    }

    /// Create a zero-length batch with the same item shape as `self`.
    pub fn empty_like(&self) -> Self {
        let (height, width, channels) = self.item_shape();
        Self::empty(height, width, channels)
    }

    /// Create a single-item RGB batch filled with one color.
    ///
    /// Alpha is ignored.
    pub fn solid(height: usize, width: usize, color: Color) -> Self {
        let rgb = color.to_normalized_rgb();
        let data = Array4::from_shape_fn((1, height, width, RGB_CHANNELS), |(_, _, _, c)| rgb[c]);
        Self { data }
    }

    /// Create a single-item RGB batch from an image.
    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_rgb(&image.to_rgb8())
    }

    /// Create a single-item RGB batch from an 8-bit RGB buffer.
    pub fn from_rgb(rgb: &RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let data = Array4::from_shape_fn(
            (1, height as usize, width as usize, RGB_CHANNELS),
            |(_, y, x, c)| f32::from(rgb.get_pixel(x as u32, y as u32)[c]) / 255.0,
        );
        Self { data }
    }

    /// Stack item views along a new leading axis.
    pub fn stack(items: &[ArrayView3<'_, f32>]) -> Result<Self, BatchError> {
        let first = items.first().ok_or(BatchError::NoItems)?;
        let expected = first.dim();
        if let Some(bad) = items.iter().find(|item| item.dim() != expected) {
            return Err(BatchError::ShapeMismatch {
                expected,
                got: bad.dim(),
            });
        }
        let data = ndarray::stack(Axis(0), items)?;
        Ok(Self { data })
    }

    /// Concatenate batches along the item axis.
    pub fn concat(batches: &[ImageBatch]) -> Result<Self, BatchError> {
        let first = batches.first().ok_or(BatchError::NoItems)?;
        let expected = first.item_shape();
        if let Some(bad) = batches.iter().find(|b| b.item_shape() != expected) {
            return Err(BatchError::ShapeMismatch {
                expected,
                got: bad.item_shape(),
            });
        }
        let views: Vec<_> = batches.iter().map(|b| b.data.view()).collect();
        let data = ndarray::concatenate(Axis(0), &views)?;
        Ok(Self { data })
    }

    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Check if the batch has no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item height in pixels.
    pub fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Item width in pixels.
    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Channels per pixel.
    pub fn channels(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    /// Per-item shape as `(height, width, channels)`.
    pub fn item_shape(&self) -> (usize, usize, usize) {
        (self.height(), self.width(), self.channels())
    }

    /// Borrow the underlying array.
    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    /// Take the underlying array.
    pub fn into_inner(self) -> Array4<f32> {
        self.data
    }

    /// View a single item. Returns None if out of range.
    pub fn item(&self, index: usize) -> Option<ArrayView3<'_, f32>> {
        (index < self.len()).then(|| self.data.index_axis(Axis(0), index))
    }

    /// Iterate over item views in order.
    pub fn items(&self) -> impl Iterator<Item = ArrayView3<'_, f32>> {
        self.data.axis_iter(Axis(0))
    }

    /// Copy the items in `start..end`.
    ///
    /// Both bounds are clamped to the batch; an inverted range yields an empty
    /// batch of the same item shape.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self {
            data: self.data.slice(s![start..end, .., .., ..]).to_owned(),
        }
    }

    /// Convert one item back to an 8-bit image.
    ///
    /// Single-channel items become grayscale, four-channel items RGBA, and
    /// everything else RGB from the first three channels (missing channels
    /// repeat the last one). Items without channels have no image.
    pub fn item_to_image(&self, index: usize) -> Option<DynamicImage> {
        let item = self.item(index)?;
        let (height, width, channels) = item.dim();
        if channels == 0 {
            return None;
        }
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

        let image = match channels {
            1 => DynamicImage::ImageLuma8(image::GrayImage::from_fn(
                width as u32,
                height as u32,
                |x, y| image::Luma([to_u8(item[[y as usize, x as usize, 0]])]),
            )),
            4 => DynamicImage::ImageRgba8(RgbaImage::from_fn(width as u32, height as u32, |x, y| {
                let (x, y) = (x as usize, y as usize);
                image::Rgba([
                    to_u8(item[[y, x, 0]]),
                    to_u8(item[[y, x, 1]]),
                    to_u8(item[[y, x, 2]]),
                    to_u8(item[[y, x, 3]]),
                ])
            })),
            _ => DynamicImage::ImageRgb8(RgbImage::from_fn(width as u32, height as u32, |x, y| {
                let (x, y) = (x as usize, y as usize);
                let channel = |c: usize| to_u8(item[[y, x, c.min(channels - 1)]]);
                image::Rgb([channel(0), channel(1), channel(2)])
            })),
        };
        Some(image)
    }
}
