//! Execution and validation contexts.
//!
//! Contexts carry the inputs and parameters the host supplies for one node
//! invocation, collect the outputs, and own the invocation's diagnostics.

use crate::core::batch::ImageBatch;
use crate::core::diagnostics::{Diagnostic, Diagnostics};
use crate::core::error::{ExecutionError, NodeId};
use crate::core::types::Value;
use std::collections::HashMap;

/// Context provided during node validation.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// ID of the node being validated.
    pub node_id: NodeId,
    /// Input values.
    inputs: HashMap<String, Value>,
    /// Parameter values.
    parameters: HashMap<String, Value>,
}

impl ValidationContext {
    /// Create a new validation context.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            inputs: HashMap::new(),
            parameters: HashMap::new(),
        }
    }

    /// Add an input value to the context.
    pub fn add_input(&mut self, name: impl Into<String>, value: Value) {
        self.inputs.insert(name.into(), value);
    }

    /// Add a parameter value to the context.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.parameters.insert(name.into(), value);
    }

    /// Get all inputs.
    pub fn inputs(&self) -> &HashMap<String, Value> {
        &self.inputs
    }

    /// Get all parameters.
    pub fn parameters(&self) -> &HashMap<String, Value> {
        &self.parameters
    }
}

/// Context provided during node execution.
#[derive(Debug)]
pub struct ExecutionContext {
    /// ID of the node being executed.
    pub node_id: NodeId,
    /// Input values.
    inputs: HashMap<String, Value>,
    /// Parameter values.
    parameters: HashMap<String, Value>,
    /// Output values set by the node.
    outputs: HashMap<String, Value>,
    /// Warnings recorded during execution.
    diagnostics: Diagnostics,
}

impl ExecutionContext {
    /// Create a new execution context.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            inputs: HashMap::new(),
            parameters: HashMap::new(),
            outputs: HashMap::new(),
            diagnostics: Diagnostics::new(format!("node {}", node_id)),
        }
    }

    /// Add an input value to the context.
    pub fn add_input(&mut self, name: impl Into<String>, value: Value) {
        self.inputs.insert(name.into(), value);
    }

    /// Add a parameter value to the context.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.parameters.insert(name.into(), value);
    }

    /// Name the diagnostics channel after the node being run.
    pub fn set_diagnostics_target(&mut self, target: impl Into<String>) {
        self.diagnostics.set_target(target);
    }

    /// Take ownership of all outputs.
    pub fn take_outputs(self) -> HashMap<String, Value> {
        self.outputs
    }

    // ========================================================================
    // Input Getters
    // ========================================================================

    /// Take ownership of an input value.
    pub fn take_input(&mut self, name: &str) -> Result<Value, ExecutionError> {
        self.inputs.remove(name).ok_or_else(|| ExecutionError::MissingInput {
            node_id: self.node_id,
            port: name.to_string(),
        })
    }

    /// Take ownership of an input as a batch.
    pub fn take_input_batch(&mut self, name: &str) -> Result<ImageBatch, ExecutionError> {
        match self.take_input(name)? {
            Value::Batch(batch) => Ok(batch),
            _ => Err(ExecutionError::NodeExecution {
                node_id: self.node_id,
                error: format!("Input '{}' is not an image batch", name),
            }),
        }
    }

    // ========================================================================
    // Parameter Getters
    // ========================================================================

    /// Get a parameter value by name.
    pub fn get_parameter(&self, name: &str) -> Result<&Value, ExecutionError> {
        self.parameters.get(name).ok_or_else(|| ExecutionError::MissingParameter {
            node_id: self.node_id,
            parameter: name.to_string(),
        })
    }

    /// Get a parameter as an integer.
    pub fn get_integer(&self, name: &str) -> Result<i64, ExecutionError> {
        self.get_parameter(name)?
            .as_integer()
            .ok_or_else(|| ExecutionError::NodeExecution {
                node_id: self.node_id,
                error: format!("Parameter '{}' is not an integer", name),
            })
    }

    /// Get a parameter as a float.
    pub fn get_float(&self, name: &str) -> Result<f64, ExecutionError> {
        self.get_parameter(name)?
            .as_float()
            .ok_or_else(|| ExecutionError::NodeExecution {
                node_id: self.node_id,
                error: format!("Parameter '{}' is not a float", name),
            })
    }

    /// Get a parameter as a string.
    pub fn get_string(&self, name: &str) -> Result<&str, ExecutionError> {
        self.get_parameter(name)?
            .as_string()
            .ok_or_else(|| ExecutionError::NodeExecution {
                node_id: self.node_id,
                error: format!("Parameter '{}' is not a string", name),
            })
    }

    // ========================================================================
    // Output Setters
    // ========================================================================

    /// Set an output value.
    pub fn set_output(&mut self, name: impl Into<String>, value: Value) -> Result<(), ExecutionError> {
        self.outputs.insert(name.into(), value);
        Ok(())
    }

    /// Set an output batch.
    pub fn set_output_batch(&mut self, name: impl Into<String>, batch: ImageBatch) -> Result<(), ExecutionError> {
        self.set_output(name, Value::Batch(batch))
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable access for operations that record warnings.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Take the recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

/// Convert ValidationContext to ExecutionContext.
impl From<ValidationContext> for ExecutionContext {
    fn from(val_ctx: ValidationContext) -> Self {
        let mut exec_ctx = ExecutionContext::new(val_ctx.node_id);
        for (name, value) in val_ctx.inputs {
            exec_ctx.add_input(name, value);
        }
        for (name, value) in val_ctx.parameters {
            exec_ctx.add_parameter(name, value);
        }
        exec_ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::DiagnosticKind;

    #[test]
    fn test_validation_context_inputs() {
        let mut ctx = ValidationContext::new(NodeId::new());
        ctx.add_input("images", Value::Batch(ImageBatch::empty(1, 1, 3)));
        ctx.add_parameter("threshold", Value::Float(0.5));

        assert!(ctx.inputs().contains_key("images"));
        assert_eq!(ctx.parameters().get("threshold"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn test_execution_context_getters() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_input("images", Value::Batch(ImageBatch::empty(2, 2, 3)));
        ctx.add_parameter("start_index", Value::Integer(3));
        ctx.add_parameter("image_data", Value::String("[]".to_string()));

        assert_eq!(ctx.get_integer("start_index").unwrap(), 3);
        assert_eq!(ctx.get_float("start_index").unwrap(), 3.0);
        assert_eq!(ctx.get_string("image_data").unwrap(), "[]");
        assert!(ctx.get_integer("image_data").is_err());
        assert!(matches!(
            ctx.take_input_batch("masks"),
            Err(ExecutionError::MissingInput { .. })
        ));

        assert_eq!(ctx.take_input_batch("images").unwrap().item_shape(), (2, 2, 3));
        assert!(matches!(
            ctx.take_input_batch("images"),
            Err(ExecutionError::MissingInput { .. })
        ));
    }

    #[test]
    fn test_execution_context_outputs() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.set_output_batch("images", ImageBatch::empty(1, 1, 3)).unwrap();

        let outputs = ctx.take_outputs();
        assert_eq!(outputs.get("images").and_then(Value::as_batch).map(ImageBatch::len), Some(0));
    }

    #[test]
    fn test_diagnostics_survive_retarget() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.diagnostics_mut().warn(DiagnosticKind::EmptyResult, "nothing");
        ctx.set_diagnostics_target("ImageBatchTrim");
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.take_diagnostics().len(), 1);
        assert!(ctx.diagnostics().is_empty());
    }
}
