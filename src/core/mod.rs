//! Core types and traits for image batch nodes.
//!
//! This module contains the foundational types the nodes are built from:
//! - Value types and the `ImageBatch` array
//! - Port and parameter definitions and constraints
//! - Node traits and metadata
//! - Error types and the diagnostics channel
//! - Execution and validation contexts
//! - File resolution

pub mod batch;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod mask;
pub mod node;
pub mod port;
pub mod resolve;
pub mod types;

// Re-export commonly used types
pub use batch::ImageBatch;
pub use context::{ExecutionContext, ValidationContext};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{
    BatchError, BatchUtilsError, ConfigError, ExecutionError, NodeId, ResolveError, ValidationError,
};
pub use node::{Category, FilterNode, NodeMetadata};
pub use port::{Constraint, ParameterDefinition, PortDefinition, UiHint};
pub use resolve::{FileResolver, FolderKind, FolderPaths};
pub use types::{Color, PortType, Value};
