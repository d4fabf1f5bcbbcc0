//! Error types for image-batch-utils.
//!
//! Uses thiserror for structured errors with context. Conditions the nodes
//! are expected to absorb (bad documents, missing files, short batches) are
//! not errors at all: they are recorded as diagnostics and substituted with
//! placeholders. The types here cover the remaining cases:
//! - Host-contract violations (missing inputs, mistyped parameters)
//! - Batch shape violations
//! - I/O helpers used by the CLI

use crate::core::types::PortType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a single node invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Errors from loading and saving batches on disk.
#[derive(Error, Debug)]
pub enum BatchUtilsError {
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{0}")]
    Other(String),
}

/// Errors from the pre-execution validation phase.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: PortType, got: PortType },

    #[error("Missing required input '{port}' on node {node_id}")]
    MissingRequiredInput { node_id: NodeId, port: String },

    #[error("Constraint violation on node {node_id}, parameter '{parameter}': {error}")]
    ConstraintViolation {
        node_id: NodeId,
        parameter: String,
        error: String,
    },
}

/// Errors during node execution.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Node {node_id} execution failed: {error}")]
    NodeExecution { node_id: NodeId, error: String },

    #[error("Missing input '{port}' for node {node_id}")]
    MissingInput { node_id: NodeId, port: String },

    #[error("Missing parameter '{parameter}' for node {node_id}")]
    MissingParameter { node_id: NodeId, parameter: String },

    #[error("Node {node_id}: {source}")]
    Batch {
        node_id: NodeId,
        #[source]
        source: BatchError,
    },

    #[error("Unknown node type '{0}'")]
    UnknownNode(String),
}

/// Shape errors from building or combining batches.
#[derive(Error, Debug, Clone)]
pub enum BatchError {
    #[error("Item shape {got:?} does not match batch item shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },

    #[error("Invalid batch shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Cannot build a batch from zero items without an item shape")]
    NoItems,
}

/// Failures of the file-resolution collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("File name is empty")]
    EmptyName,

    #[error("File name '{0}' must be relative to its folder")]
    NotRelative(String),

    #[error("File name '{0}' escapes its folder")]
    Traversal(String),
}

/// Errors reading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Error Utilities
// ============================================================================

impl ValidationError {
    /// Get suggestion for fixing this error.
    ///
    /// Constraint violations already name the allowed values, so they carry
    /// no separate suggestion.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            ValidationError::TypeMismatch { expected, .. } => {
                Some(format!("Connect an output of type {}", expected))
            }
            ValidationError::MissingRequiredInput { port, .. } => {
                Some(format!("Connect an output to the '{}' input", port))
            }
            ValidationError::ConstraintViolation { .. } => None,
        }
    }
}

/// Result type alias for library operations.
pub type BatchUtilsResult<T> = Result<T, BatchUtilsError>;
