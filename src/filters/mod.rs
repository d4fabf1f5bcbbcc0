//! Node module.
//!
//! Contains the node registry, the host registration schema, and the
//! built-in batch nodes.

pub mod builtin;
pub mod registry;
pub mod schema;

pub use registry::{FilterFactory, FilterRegistry};
pub use schema::{HostManifest, NodeSchema};
