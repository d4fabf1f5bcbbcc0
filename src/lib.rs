//! # Image Batch Utils
//!
//! Image batch nodes for a node-graph image generation host. Each node is a
//! small, stateless batch operation the host invokes once per graph run:
//!
//! - **Trim Image Batch** (`ImageBatchTrim`): keep the items between two
//!   indices, clamped to the batch.
//! - **Create Image Batch** (`CreateImageBatch`): build a batch from a JSON
//!   list of solid colors and image files, padded or truncated to a size.
//! - **Select Image Batch by Mask** (`ImageBatchSelectByMask`): pick each
//!   item from one of two batches by the mean luminance of a mask.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use image_batch_utils::prelude::*;
//!
//! let registry = FilterRegistry::with_builtins();
//! let node = registry.create("ImageBatchTrim").unwrap();
//!
//! let mut ctx = ExecutionContext::new(NodeId::new());
//! ctx.add_input("images", Value::Batch(images));
//! ctx.add_parameter("start_index", Value::Integer(3));
//! ctx.add_parameter("end_index", Value::Integer(7));
//! node.execute(&mut ctx)?;
//!
//! for warning in ctx.take_diagnostics() {
//!     eprintln!("{}", warning);
//! }
//! let trimmed = ctx.take_outputs().remove("trimmed_images");
//! ```
//!
//! The batch operations are also available as plain functions
//! ([`trim_batch`](filters::builtin::trim_batch),
//! [`create_batch`](filters::builtin::create_batch),
//! [`select_by_mask`](filters::builtin::select_by_mask)) that take an
//! explicit [`Diagnostics`](core::diagnostics::Diagnostics) channel.
//!
//! ## Architecture
//!
//! - [`core`]: batches, values, node descriptors, contexts, errors, diagnostics
//! - [`filters`]: node registry, host schema export, and the built-in nodes
//! - [`config`]: TOML configuration
//! - [`io`]: loading and saving batches as image folders

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod filters;
pub mod io;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use image_batch_utils::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::batch::ImageBatch;
    pub use crate::core::types::{Color, PortType, Value};

    // Node traits and types
    pub use crate::core::node::{Category, FilterNode, NodeMetadata};
    pub use crate::core::port::{Constraint, ParameterDefinition, PortDefinition, UiHint};

    // Contexts and diagnostics
    pub use crate::core::context::{ExecutionContext, ValidationContext};
    pub use crate::core::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

    // Errors
    pub use crate::core::error::{
        BatchError, BatchUtilsError, BatchUtilsResult, ExecutionError, NodeId, ValidationError,
    };

    // File resolution and configuration
    pub use crate::config::Config;
    pub use crate::core::resolve::{FileResolver, FolderPaths};

    // Registry
    pub use crate::filters::registry::{FilterFactory, FilterRegistry};
    pub use crate::filters::schema::HostManifest;

    // Built-in nodes
    pub use crate::filters::builtin::{
        create_batch, select_by_mask, trim_batch, BatchItemSpec, BatchSpecEditor, CreateImageBatch,
        ImageBatchSelectByMask, ImageBatchTrim,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use ndarray::Array4;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "image-batch-utils");
    }

    #[test]
    fn test_registry_with_builtins() {
        let registry = FilterRegistry::with_builtins();
        assert!(registry.contains("ImageBatchTrim"));
        assert!(registry.contains("CreateImageBatch"));
        assert!(registry.contains("ImageBatchSelectByMask"));
    }

    #[test]
    fn test_trim_end_to_end_through_registry() {
        let registry = FilterRegistry::with_builtins();
        let node = registry.create("ImageBatchTrim").unwrap();
        let images = ImageBatch::new(Array4::from_shape_fn((10, 2, 2, 3), |(i, _, _, _)| i as f32 / 10.0));

        let mut val_ctx = ValidationContext::new(NodeId::new());
        val_ctx.add_input("images", Value::Batch(images.clone()));
        val_ctx.add_parameter("start_index", Value::Integer(3));
        val_ctx.add_parameter("end_index", Value::Integer(7));
        node.validate(&val_ctx).unwrap();

        let mut ctx = ExecutionContext::from(val_ctx);
        node.execute(&mut ctx).unwrap();
        assert!(ctx.take_diagnostics().is_empty());

        let outputs = ctx.take_outputs();
        assert_eq!(outputs.get("trimmed_images").and_then(Value::as_batch), Some(&images.slice(3, 7)));
    }

    #[test]
    fn test_create_then_select() {
        let registry = FilterRegistry::with_builtins();
        let red = r##"[{"type":"color","value":"#FF0000"},{"type":"color","value":"#FF0000"}]"##;
        let mixed = r##"[{"type":"color","value":"#000000"},{"type":"color","value":"#FFFFFF"}]"##;

        let make = |doc: &str| {
            let mut ctx = ExecutionContext::new(NodeId::new());
            ctx.add_parameter("width", Value::Integer(64));
            ctx.add_parameter("height", Value::Integer(64));
            ctx.add_parameter("batch_size", Value::Integer(2));
            ctx.add_parameter("image_data", Value::String(doc.to_string()));
            registry.create("CreateImageBatch").unwrap().execute(&mut ctx).unwrap();
            ctx.take_outputs().remove("images").unwrap()
        };

        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_input("images_a", make(red));
        ctx.add_input("images_b", Value::Batch(ImageBatch::new(Array4::zeros((2, 64, 64, 3)))));
        ctx.add_input("masks", make(mixed));
        registry.create("ImageBatchSelectByMask").unwrap().execute(&mut ctx).unwrap();

        let outputs = ctx.take_outputs();
        let selected = outputs.get("selected_images").and_then(Value::as_batch).unwrap();
        assert_eq!(selected.data()[[0, 0, 0, 0]], 1.0);
        assert_eq!(selected.data()[[1, 0, 0, 0]], 0.0);
    }

    #[test]
    fn test_validation_rejects_out_of_range_threshold() {
        let registry = FilterRegistry::with_builtins();
        let node = registry.create("ImageBatchSelectByMask").unwrap();

        let mut ctx = ValidationContext::new(NodeId::new());
        for port in ["images_a", "images_b", "masks"] {
            ctx.add_input(port, Value::Batch(ImageBatch::empty(1, 1, 3)));
        }
        ctx.add_parameter("threshold", Value::Float(1.5));
        assert!(matches!(node.validate(&ctx), Err(ValidationError::ConstraintViolation { .. })));
    }
}
