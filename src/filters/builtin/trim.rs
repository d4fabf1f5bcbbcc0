//! Batch trim: ImageBatchTrim

use crate::core::batch::ImageBatch;
use crate::core::context::ExecutionContext;
use crate::core::diagnostics::{DiagnosticKind, Diagnostics};
use crate::core::error::ExecutionError;
use crate::core::node::{Category, FilterNode, NodeMetadata};
use crate::core::port::{ParameterDefinition, PortDefinition};
use crate::core::types::{PortType, Value};
use crate::filters::registry::FilterRegistry;

/// Register the trim node.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(ImageBatchTrim));
}

/// Keeps the items of a batch between two indices.
#[derive(Debug, Clone)]
pub struct ImageBatchTrim;

impl FilterNode for ImageBatchTrim {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("ImageBatchTrim", "Trim Image Batch")
            .description("Trim an image batch to the items between a start and an end index")
            .category(Category::Batch)
            .input(
                PortDefinition::input("images", PortType::Image)
                    .with_description("Batch to trim")
            )
            .output(
                PortDefinition::output("trimmed_images", PortType::Image)
                    .with_description("Items in [start_index, end_index)")
            )
            .parameter(
                ParameterDefinition::new("start_index", PortType::Integer, Value::Integer(0))
                    .with_description("First item to keep")
                    .with_range(0.0, 9998.0)
                    .with_step(1.0),
            )
            .parameter(
                ParameterDefinition::new("end_index", PortType::Integer, Value::Integer(9999))
                    .with_description("One past the last item to keep")
                    .with_range(1.0, 9999.0)
                    .with_step(1.0),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let images = ctx.take_input_batch("images")?;
        let start = ctx.get_integer("start_index").unwrap_or(0);
        let end = ctx.get_integer("end_index").unwrap_or(9999);

        let trimmed = trim_batch(&images, start, end, ctx.diagnostics_mut());

        ctx.set_output_batch("trimmed_images", trimmed)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn FilterNode> {
        Box::new(self.clone())
    }
}

/// Return `images[start..end]` with both indices clamped to `[0, len]`.
///
/// An empty range warns and yields a zero-length batch with the input's item
/// shape. Never fails.
pub fn trim_batch(images: &ImageBatch, start: i64, end: i64, diagnostics: &mut Diagnostics) -> ImageBatch {
    let len = images.len();
    let clamped_start = clamp_index(start, len);
    let clamped_end = clamp_index(end, len);

    if clamped_start >= clamped_end {
        diagnostics.warn(
            DiagnosticKind::EmptyResult,
            format!(
                "Image Batch Trim resulted in an empty batch. Start ({}) is not less than End ({}).",
                start, end
            ),
        );
        return images.empty_like();
    }

    let trimmed = images.slice(clamped_start, clamped_end);
    diagnostics.info(format!(
        "Original size: {}, Trimmed to range [{}:{}], New size: {}",
        len,
        clamped_start,
        clamped_end,
        trimmed.len()
    ));
    trimmed
}

fn clamp_index(index: i64, len: usize) -> usize {
    usize::try_from(index.max(0)).map_or(len, |i| i.min(len))
}
