//! Batch creator: CreateImageBatch
//!
//! Builds a batch from the `image_data` document, one item per spec. Items
//! never fail: bad colors, unknown items and unreadable files are replaced
//! by placeholders and reported through [`Diagnostics`].

use crate::config::Config;
use crate::core::batch::{ImageBatch, RGB_CHANNELS};
use crate::core::context::ExecutionContext;
use crate::core::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::core::error::ExecutionError;
use crate::core::node::{Category, FilterNode, NodeMetadata};
use crate::core::port::{ParameterDefinition, PortDefinition, UiHint};
use crate::core::resolve::{FileResolver, FolderPaths};
use crate::core::types::{Color, PortType, Value};
use crate::filters::builtin::item_spec::{parse_item_specs, reconcile_specs, BatchItemSpec};
use crate::filters::registry::FilterRegistry;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::{Array3, Array4, Axis};
use rayon::prelude::*;
use std::sync::Arc;

/// Largest width or height the node accepts.
pub const MAX_DIMENSION: i64 = 4096;

/// Register the creator node, resolving files through the configured folders.
pub fn register(registry: &mut FilterRegistry, config: &Config) {
    let resolver: Arc<dyn FileResolver> = Arc::new(config.folders.to_folder_paths());
    let filter = config.create.resample.filter_type();
    registry.register(move || Box::new(CreateImageBatch::new(resolver.clone(), filter)));
}

/// Creates a batch from color swatches and image files.
#[derive(Clone)]
pub struct CreateImageBatch {
    resolver: Arc<dyn FileResolver>,
    filter: FilterType,
}

impl CreateImageBatch {
    /// Create the node with a file resolver and resampling filter.
    pub fn new(resolver: Arc<dyn FileResolver>, filter: FilterType) -> Self {
        Self { resolver, filter }
    }
}

impl Default for CreateImageBatch {
    fn default() -> Self {
        Self::new(Arc::new(FolderPaths::default()), FilterType::Lanczos3)
    }
}

impl std::fmt::Debug for CreateImageBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateImageBatch")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl FilterNode for CreateImageBatch {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("CreateImageBatch", "Create Image Batch")
            .description("Create a batch of images from solid colors and image files")
            .category(Category::Batch)
            .output(
                PortDefinition::output("images", PortType::Image)
                    .with_description("The created batch")
            )
            .parameter(
                ParameterDefinition::new("width", PortType::Integer, Value::Integer(512))
                    .with_description("Item width in pixels")
                    .with_range(64.0, MAX_DIMENSION as f64)
                    .with_step(8.0),
            )
            .parameter(
                ParameterDefinition::new("height", PortType::Integer, Value::Integer(512))
                    .with_description("Item height in pixels")
                    .with_range(64.0, MAX_DIMENSION as f64)
                    .with_step(8.0),
            )
            .parameter(
                ParameterDefinition::new("batch_size", PortType::Integer, Value::Integer(4))
                    .with_description("Number of items")
                    .with_range(1.0, 64.0)
                    .with_step(1.0),
            )
            .parameter(
                ParameterDefinition::new("image_data", PortType::String, Value::String("[]".to_string()))
                    .with_description("JSON list of color and file items")
                    .with_ui_hint(UiHint::BatchEditor),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let width = ctx.get_integer("width").unwrap_or(512).clamp(1, MAX_DIMENSION) as u32;
        let height = ctx.get_integer("height").unwrap_or(512).clamp(1, MAX_DIMENSION) as u32;
        let batch_size = ctx.get_integer("batch_size").unwrap_or(4).max(0) as usize;
        let image_data = ctx.get_string("image_data").unwrap_or("[]").to_string();

        let batch = create_batch(
            width,
            height,
            batch_size,
            &image_data,
            self.resolver.as_ref(),
            self.filter,
            ctx.diagnostics_mut(),
        );

        ctx.set_output_batch("images", batch)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn FilterNode> {
        Box::new(self.clone())
    }
}

/// Build a `batch_size`-item RGB batch of `width × height` images.
///
/// A malformed document yields an empty batch; otherwise the item list is
/// padded with black or truncated to `batch_size`. Items are rendered in
/// parallel; output order and warning order follow the document.
pub fn create_batch(
    width: u32,
    height: u32,
    batch_size: usize,
    image_data: &str,
    resolver: &dyn FileResolver,
    filter: FilterType,
    diagnostics: &mut Diagnostics,
) -> ImageBatch {
    let (h, w) = (height as usize, width as usize);

    let Some(specs) = parse_item_specs(image_data, diagnostics) else {
        return ImageBatch::empty(h, w, RGB_CHANNELS);
    };

    if specs.len() != batch_size {
        diagnostics.warn(
            DiagnosticKind::SizeMismatch,
            format!(
                "image_data length ({}) does not match batch_size ({}). Truncating or padding.",
                specs.len(),
                batch_size
            ),
        );
    }
    let specs = reconcile_specs(specs, batch_size);

    if specs.is_empty() {
        diagnostics.warn(
            DiagnosticKind::EmptyResult,
            "Create Image Batch resulted in an empty batch.",
        );
        return ImageBatch::empty(h, w, RGB_CHANNELS);
    }

    let rendered: Vec<(Array3<f32>, Option<Diagnostic>)> = specs
        .par_iter()
        .enumerate()
        .map(|(index, spec)| {
            let (item, warning) = render_item(spec, width, height, resolver, filter);
            (item, warning.map(|d| d.for_item(index)))
        })
        .collect();

    let mut data = Array4::zeros((rendered.len(), h, w, RGB_CHANNELS));
    for (mut slot, (item, warning)) in data.axis_iter_mut(Axis(0)).zip(rendered) {
        slot.assign(&item);
        if let Some(warning) = warning {
            diagnostics.push(warning);
        }
    }

    let batch = ImageBatch::new(data);
    diagnostics.info(format!("Created a batch of {} images.", batch.len()));
    batch
}

/// Render one spec into a `[row, col, channel]` item.
fn render_item(
    spec: &BatchItemSpec,
    width: u32,
    height: u32,
    resolver: &dyn FileResolver,
    filter: FilterType,
) -> (Array3<f32>, Option<Diagnostic>) {
    let (h, w) = (height as usize, width as usize);
    match spec {
        BatchItemSpec::Color(hex) => match Color::from_hex(hex) {
            Ok(color) => (solid_item(h, w, color), None),
            Err(e) => (
                solid_item(h, w, Color::BLACK),
                Some(Diagnostic::new(
                    DiagnosticKind::InvalidColor,
                    format!("{}; using black", e),
                )),
            ),
        },
        BatchItemSpec::File(name) if name.is_empty() => (
            solid_item(h, w, Color::MAGENTA),
            Some(Diagnostic::new(
                DiagnosticKind::MissingFile,
                "File item has no file name; using magenta placeholder",
            )),
        ),
        BatchItemSpec::File(name) => match load_fitted(name, width, height, resolver, filter) {
            Ok(item) => (item, None),
            Err(e) => (
                solid_item(h, w, Color::RED),
                Some(Diagnostic::new(
                    DiagnosticKind::LoadFailure,
                    format!("Error loading image '{}': {}", name, e),
                )),
            ),
        },
        BatchItemSpec::Unknown => (
            solid_item(h, w, Color::BLACK),
            Some(Diagnostic::new(
                DiagnosticKind::UnknownItem,
                "Unknown item type; using black",
            )),
        ),
    }
}

/// Resolve, open and aspect-fill a file to exactly `width × height`.
///
/// The file handle is dropped before returning.
fn load_fitted(
    name: &str,
    width: u32,
    height: u32,
    resolver: &dyn FileResolver,
    filter: FilterType,
) -> Result<Array3<f32>, String> {
    let path = resolver.resolve(name).map_err(|e| e.to_string())?;
    let loaded = image::open(&path).map_err(|e| e.to_string())?;
    log::debug!("Loaded {} ({}x{})", path.display(), loaded.width(), loaded.height());

    let rgb = DynamicImage::ImageRgb8(loaded.to_rgb8());
    let fitted = rgb.resize_to_fill(width, height, filter);
    Ok(first_item(ImageBatch::from_image(&fitted)))
}

fn solid_item(height: usize, width: usize, color: Color) -> Array3<f32> {
    first_item(ImageBatch::solid(height, width, color))
}

fn first_item(batch: ImageBatch) -> Array3<f32> {
    batch.into_inner().index_axis_move(Axis(0), 0)
}
