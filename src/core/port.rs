//! Port and parameter definitions for node inputs/outputs.
//!
//! Ports are the batch connections of a node; parameters are the widget
//! values the host renders (integers, floats, strings). Both carry a type and
//! optional constraints for validation.

use crate::core::types::{PortType, Value};
use serde::{Deserialize, Serialize};

/// Definition of a node port (input or output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDefinition {
    /// Unique name within the node
    pub name: String,
    /// Type of data this port accepts/produces
    pub port_type: PortType,
    /// Whether this port is optional
    pub optional: bool,
    /// Description for documentation and tooltips
    pub description: String,
}

/// UI hints for parameter display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "widget", content = "options")]
pub enum UiHint {
    /// Default input widget based on type
    Default,
    /// Slider for numeric values
    Slider,
    /// Value is owned by the host's batch editor widget and hidden otherwise
    BatchEditor,
}

/// Definition of a node parameter (widget value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Unique name within the node
    pub name: String,
    /// Type of the parameter
    pub param_type: PortType,
    /// Default value (required for parameters)
    pub default_value: Value,
    /// Description for documentation
    pub description: String,
    /// Constraints for validation
    pub constraints: Vec<Constraint>,
    /// UI widget hint
    pub ui_hint: UiHint,
    /// Whether the host may omit this parameter
    pub optional: bool,
}

/// Constraints that can be applied to parameter values.
///
/// Checked during validation before execution begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum Constraint {
    /// Numeric value must be within range [min, max]
    Range { min: f64, max: f64 },
    /// Numeric value must be a multiple of step
    Step(f64),
}

// ============================================================================
// PortDefinition Builder Pattern
// ============================================================================

impl PortDefinition {
    /// Create a new input port definition.
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        Self::new(name.into(), port_type)
    }

    /// Create a new output port definition.
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        Self::new(name.into(), port_type)
    }

    fn new(name: String, port_type: PortType) -> Self {
        Self {
            name,
            port_type,
            optional: false,
            description: String::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark this port as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Validate a value against this port's type.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        if !self.port_type.matches(value) {
            return Err(format!(
                "Type mismatch for port '{}': expected {}, got {}",
                self.name,
                self.port_type,
                value.get_type()
            ));
        }
        Ok(())
    }
}

// ============================================================================
// ParameterDefinition Builder Pattern
// ============================================================================

impl ParameterDefinition {
    /// Create a new parameter definition.
    pub fn new(name: impl Into<String>, param_type: PortType, default_value: Value) -> Self {
        Self {
            name: name.into(),
            param_type,
            default_value,
            description: String::new(),
            constraints: Vec::new(),
            ui_hint: UiHint::Default,
            optional: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a range constraint.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.constraints.push(Constraint::Range { min, max });
        self
    }

    /// Add a step constraint.
    pub fn with_step(mut self, step: f64) -> Self {
        self.constraints.push(Constraint::Step(step));
        self
    }

    /// Set the UI hint.
    pub fn with_ui_hint(mut self, ui_hint: UiHint) -> Self {
        self.ui_hint = ui_hint;
        self
    }

    /// Mark this parameter as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Lower bound from the first range constraint.
    pub fn min(&self) -> Option<f64> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Range { min, .. } => Some(*min),
            _ => None,
        })
    }

    /// Upper bound from the first range constraint.
    pub fn max(&self) -> Option<f64> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Range { max, .. } => Some(*max),
            _ => None,
        })
    }

    /// Step from the first step constraint.
    pub fn step(&self) -> Option<f64> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Step(step) => Some(*step),
            _ => None,
        })
    }

    /// Validate a value against this parameter's type and constraints.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        if !self.param_type.matches(value) {
            return Err(format!(
                "Type mismatch for parameter '{}': expected {}, got {}",
                self.name,
                self.param_type,
                value.get_type()
            ));
        }

        for constraint in &self.constraints {
            constraint.validate(value)?;
        }

        Ok(())
    }
}

// ============================================================================
// Constraint Validation
// ============================================================================

impl Constraint {
    /// Validate a value against this constraint.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            Constraint::Range { min, max } => {
                if let Some(num) = value.as_float() {
                    if num < *min || num > *max {
                        return Err(format!("Value {} is out of range [{}, {}]", num, min, max));
                    }
                }
            }

            Constraint::Step(step) => {
                if let Some(num) = value.as_float() {
                    let steps = num / step;
                    if (steps - steps.round()).abs() > 1e-6 {
                        return Err(format!("Value {} must be a multiple of {}", num, step));
                    }
                }
            }
        }

        Ok(())
    }

    /// Get a human-readable description of this constraint.
    pub fn description(&self) -> String {
        match self {
            Constraint::Range { min, max } => format!("Must be between {} and {}", min, max),
            Constraint::Step(step) => format!("Must be a multiple of {}", step),
        }
    }
}

impl Default for UiHint {
    fn default() -> Self {
        UiHint::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_builder() {
        let param = ParameterDefinition::new("start_index", PortType::Integer, Value::Integer(0))
            .with_description("First item to keep")
            .with_range(0.0, 9998.0)
            .with_step(1.0);

        assert_eq!(param.min(), Some(0.0));
        assert_eq!(param.max(), Some(9998.0));
        assert_eq!(param.step(), Some(1.0));
        assert!(!param.optional);
    }

    #[test]
    fn test_parameter_validation() {
        let param = ParameterDefinition::new("width", PortType::Integer, Value::Integer(512))
            .with_range(64.0, 4096.0)
            .with_step(8.0);

        assert!(param.validate(&Value::Integer(512)).is_ok());
        assert!(param.validate(&Value::Integer(513)).is_err());
        assert!(param.validate(&Value::Integer(8)).is_err());
        assert!(param.validate(&Value::Float(512.0)).is_err());
    }

    #[test]
    fn test_fractional_step() {
        let constraint = Constraint::Step(0.01);
        assert!(constraint.validate(&Value::Float(0.5)).is_ok());
        assert!(constraint.validate(&Value::Float(0.37)).is_ok());
        assert!(constraint.validate(&Value::Float(0.375)).is_err());
    }

    #[test]
    fn test_constraint_range_validation() {
        let constraint = Constraint::Range { min: 0.0, max: 1.0 };
        assert!(constraint.validate(&Value::Float(0.0)).is_ok());
        assert!(constraint.validate(&Value::Float(1.0)).is_ok());
        assert!(constraint.validate(&Value::Float(-0.1)).is_err());
        assert!(constraint.validate(&Value::Float(1.1)).is_err());
    }

    #[test]
    fn test_port_validation() {
        let port = PortDefinition::input("images_a", PortType::Image);
        assert!(port.validate(&Value::Batch(crate::core::batch::ImageBatch::empty(1, 1, 3))).is_ok());
        assert!(port.validate(&Value::Integer(1)).is_err());
    }
}
