//! FilterNode trait and node metadata.
//!
//! A node is split in two: a static [`NodeMetadata`] descriptor the host
//! reads at registration time (ports, parameters, constraints, category), and
//! the executable logic behind [`FilterNode::execute`]. The batch operations
//! themselves are plain functions that know nothing about the descriptor.

use crate::core::context::{ExecutionContext, ValidationContext};
use crate::core::error::{ExecutionError, ValidationError};
use crate::core::port::{ParameterDefinition, PortDefinition};
use serde::{Deserialize, Serialize};

/// Category for organizing nodes in the host's menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Image batch manipulation
    #[default]
    Batch,
}

impl Category {
    /// Menu path the host files the node under.
    pub fn host_path(&self) -> &'static str {
        match self {
            Category::Batch => "woz/Image/Batch",
        }
    }
}

/// Metadata describing a node.
///
/// Everything the host needs to render the node and wire it up, without
/// creating or running it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Unique node class identifier (e.g., "ImageBatchTrim")
    pub id: String,
    /// Human-readable name (e.g., "Trim Image Batch")
    pub name: String,
    /// Category for UI organization
    pub category: Category,
    /// Detailed description
    pub description: String,
    /// Version string
    pub version: String,
    /// Author or source
    pub author: String,

    /// Input port definitions
    pub inputs: Vec<PortDefinition>,
    /// Output port definitions
    pub outputs: Vec<PortDefinition>,
    /// Parameter definitions
    pub parameters: Vec<ParameterDefinition>,
}

impl NodeMetadata {
    /// Create a new metadata builder.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> NodeMetadataBuilder {
        NodeMetadataBuilder::new(id, name)
    }

    /// Find a parameter by name.
    pub fn get_parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Builder for NodeMetadata.
pub struct NodeMetadataBuilder {
    id: String,
    name: String,
    category: Category,
    description: String,
    version: String,
    author: String,
    inputs: Vec<PortDefinition>,
    outputs: Vec<PortDefinition>,
    parameters: Vec<ParameterDefinition>,
}

impl NodeMetadataBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::default(),
            description: String::new(),
            version: crate::VERSION.to_string(),
            author: "woz".to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Set the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an input port.
    pub fn input(mut self, port: PortDefinition) -> Self {
        self.inputs.push(port);
        self
    }

    /// Add an output port.
    pub fn output(mut self, port: PortDefinition) -> Self {
        self.outputs.push(port);
        self
    }

    /// Add a parameter.
    pub fn parameter(mut self, param: ParameterDefinition) -> Self {
        self.parameters.push(param);
        self
    }

    /// Build the metadata.
    pub fn build(self) -> NodeMetadata {
        NodeMetadata {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            version: self.version,
            author: self.author,
            inputs: self.inputs,
            outputs: self.outputs,
            parameters: self.parameters,
        }
    }
}

/// The core trait for batch nodes.
///
/// # Design
///
/// Two phases, both driven by the host:
///
/// 1. **Validation** (`validate`): checks required inputs are present and
///    parameters satisfy the descriptor's constraints. The default
///    implementation does exactly that from [`FilterNode::metadata`].
///
/// 2. **Execution** (`execute`): reads inputs and parameters, runs the batch
///    operation, and sets outputs. Recoverable conditions go to the
///    context's diagnostics, never to the error path.
///
/// # Thread Safety
///
/// `Send + Sync` bounds let the host share node instances across threads.
pub trait FilterNode: Send + Sync {
    /// Get the metadata for this node.
    ///
    /// This is called during registration and should return consistent values.
    fn metadata(&self) -> NodeMetadata;

    /// Validate the node configuration.
    fn validate(&self, ctx: &ValidationContext) -> Result<(), ValidationError> {
        validate_against_metadata(&self.metadata(), ctx)
    }

    /// Execute the node.
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError>;

    /// Clone this node into a boxed trait object.
    fn clone_box(&self) -> Box<dyn FilterNode>;
}

// Allow cloning Box<dyn FilterNode>
impl Clone for Box<dyn FilterNode> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Check a validation context against a node descriptor.
///
/// Required inputs must be present and of the right type; parameters that are
/// present must satisfy their constraints. Absent parameters fall back to
/// their defaults at execution time and are not an error.
pub fn validate_against_metadata(
    metadata: &NodeMetadata,
    ctx: &ValidationContext,
) -> Result<(), ValidationError> {
    for port in &metadata.inputs {
        match ctx.inputs().get(&port.name) {
            Some(value) => {
                if !port.port_type.matches(value) {
                    return Err(ValidationError::TypeMismatch {
                        expected: port.port_type.clone(),
                        got: value.get_type(),
                    });
                }
            }
            None if port.optional => {}
            None => {
                return Err(ValidationError::MissingRequiredInput {
                    node_id: ctx.node_id,
                    port: port.name.clone(),
                })
            }
        }
    }

    for param in &metadata.parameters {
        if let Some(value) = ctx.parameters().get(&param.name) {
            param
                .validate(value)
                .map_err(|error| ValidationError::ConstraintViolation {
                    node_id: ctx.node_id,
                    parameter: param.name.clone(),
                    error,
                })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::batch::ImageBatch;
    use crate::core::error::NodeId;
    use crate::core::types::{PortType, Value};

    fn sample_metadata() -> NodeMetadata {
        NodeMetadata::builder("TestNode", "Test Node")
            .category(Category::Batch)
            .description("A test node")
            .input(PortDefinition::input("images", PortType::Image))
            .output(PortDefinition::output("images", PortType::Image))
            .parameter(
                ParameterDefinition::new("count", PortType::Integer, Value::Integer(1))
                    .with_range(1.0, 4.0),
            )
            .build()
    }

    #[test]
    fn test_metadata_builder() {
        let metadata = sample_metadata();
        assert_eq!(metadata.id, "TestNode");
        assert_eq!(metadata.category, Category::Batch);
        assert_eq!(metadata.inputs.len(), 1);
        assert_eq!(metadata.version, crate::VERSION);
        assert!(metadata.get_parameter("count").is_some());
        assert_eq!(metadata.outputs[0].name, "images");
    }

    #[test]
    fn test_validation_requires_inputs() {
        let metadata = sample_metadata();
        let ctx = ValidationContext::new(NodeId::new());
        assert!(matches!(
            validate_against_metadata(&metadata, &ctx),
            Err(ValidationError::MissingRequiredInput { .. })
        ));
    }

    #[test]
    fn test_validation_checks_constraints() {
        let metadata = sample_metadata();
        let mut ctx = ValidationContext::new(NodeId::new());
        ctx.add_input("images", Value::Batch(ImageBatch::empty(1, 1, 3)));
        assert!(validate_against_metadata(&metadata, &ctx).is_ok());

        ctx.add_parameter("count", Value::Integer(9));
        assert!(matches!(
            validate_against_metadata(&metadata, &ctx),
            Err(ValidationError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn test_category_paths() {
        assert_eq!(Category::Batch.host_path(), "woz/Image/Batch");
        assert_eq!(Category::default(), Category::Batch);
    }
}
