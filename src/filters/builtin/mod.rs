//! Built-in batch nodes.
//!
//! This module contains the nodes that ship with the crate.

mod create;
pub mod item_spec;
mod select;
mod trim;

use crate::config::Config;
use crate::filters::registry::FilterRegistry;

/// Register all built-in nodes.
pub fn register_all(registry: &mut FilterRegistry, config: &Config) {
    trim::register(registry);
    create::register(registry, config);
    select::register(registry);
}

// Re-export for direct access
pub use create::{create_batch, CreateImageBatch, MAX_DIMENSION};
pub use item_spec::{BatchItemSpec, BatchSpecEditor};
pub use select::{select_by_mask, ImageBatchSelectByMask, DEFAULT_THRESHOLD};
pub use trim::{trim_batch, ImageBatchTrim};
