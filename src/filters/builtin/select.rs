//! Mask-based selection: ImageBatchSelectByMask

use crate::core::batch::ImageBatch;
use crate::core::context::ExecutionContext;
use crate::core::diagnostics::{DiagnosticKind, Diagnostics};
use crate::core::error::{BatchError, ExecutionError};
use crate::core::mask::mean_luminance;
use crate::core::node::{Category, FilterNode, NodeMetadata};
use crate::core::port::{ParameterDefinition, PortDefinition, UiHint};
use crate::core::types::{PortType, Value};
use crate::filters::registry::FilterRegistry;

/// Default luminance threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Register the selector node.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(ImageBatchSelectByMask));
}

/// Picks each item from batch A or batch B depending on its mask.
#[derive(Debug, Clone)]
pub struct ImageBatchSelectByMask;

impl FilterNode for ImageBatchSelectByMask {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("ImageBatchSelectByMask", "Select Image Batch by Mask")
            .description(
                "Select each item from images_a when its mask is darker than the threshold, \
                 otherwise from images_b",
            )
            .category(Category::Batch)
            .input(
                PortDefinition::input("images_a", PortType::Image)
                    .with_description("Used where the mask is dark")
            )
            .input(
                PortDefinition::input("images_b", PortType::Image)
                    .with_description("Used where the mask is bright")
            )
            .input(
                PortDefinition::input("masks", PortType::Image)
                    .with_description("One mask per item; only luminance is read")
            )
            .output(
                PortDefinition::output("selected_images", PortType::Image)
                    .with_description("Selected items")
            )
            .parameter(
                ParameterDefinition::new("threshold", PortType::Float, Value::Float(DEFAULT_THRESHOLD))
                    .with_description("Mean mask luminance at which B is chosen")
                    .with_range(0.0, 1.0)
                    .with_step(0.01)
                    .with_ui_hint(UiHint::Slider)
                    .optional(),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let images_a = ctx.take_input_batch("images_a")?;
        let images_b = ctx.take_input_batch("images_b")?;
        let masks = ctx.take_input_batch("masks")?;
        let threshold = ctx.get_float("threshold").unwrap_or(DEFAULT_THRESHOLD);

        let node_id = ctx.node_id;
        let selected = select_by_mask(&images_a, &images_b, &masks, threshold, ctx.diagnostics_mut())
            .map_err(|source| ExecutionError::Batch { node_id, source })?;

        ctx.set_output_batch("selected_images", selected)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn FilterNode> {
        Box::new(self.clone())
    }
}

/// For each aligned item, take A if the mask's mean luminance is below
/// `threshold`, otherwise B.
///
/// Only `min(len(A), len(B), len(masks))` items are processed. Uneven
/// lengths and differing A/B item shapes only warn; the call fails only when
/// the chosen items actually mix two shapes.
pub fn select_by_mask(
    images_a: &ImageBatch,
    images_b: &ImageBatch,
    masks: &ImageBatch,
    threshold: f64,
    diagnostics: &mut Diagnostics,
) -> Result<ImageBatch, BatchError> {
    let (len_a, len_b, len_masks) = (images_a.len(), images_b.len(), masks.len());
    let count = len_a.min(len_b).min(len_masks);

    if count == 0 {
        diagnostics.warn(
            DiagnosticKind::EmptyResult,
            "One of the input batches is empty. Returning an empty batch.",
        );
        return Ok(images_a.empty_like());
    }

    if len_a != len_b || len_b != len_masks {
        diagnostics.warn(
            DiagnosticKind::LengthMismatch,
            format!(
                "Input batches have different sizes ({}, {}, {}). Processing up to the shortest length: {}.",
                len_a, len_b, len_masks, count
            ),
        );
    }

    if images_a.item_shape() != images_b.item_shape() {
        diagnostics.warn(
            DiagnosticKind::ShapeMismatch,
            format!(
                "images_a and images_b have different dimensions ({:?} vs {:?}). \
                 This may cause issues in downstream nodes.",
                images_a.item_shape(),
                images_b.item_shape()
            ),
        );
    }

    let mut chosen = Vec::with_capacity(count);
    for index in 0..count {
        let (Some(a), Some(b), Some(mask)) =
            (images_a.item(index), images_b.item(index), masks.item(index))
        else {
            break;
        };
        let mean = mean_luminance(mask);
        let use_a = mean < threshold;
        log::debug!(
            "item {}: mask mean {:.4} -> {}",
            index,
            mean,
            if use_a { "A" } else { "B" }
        );
        chosen.push(if use_a { a } else { b });
    }

    let selected = ImageBatch::stack(&chosen)?;
    diagnostics.info(format!(
        "Processed {} images. Final batch size: {}.",
        count,
        selected.len()
    ));
    Ok(selected)
}
