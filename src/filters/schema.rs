//! Host registration schema.
//!
//! Renders [`NodeMetadata`] descriptors into the shape the node-graph host
//! reads when it registers plugin nodes: per-node input declarations split
//! into required and optional, output types and names, and the class and
//! display-name mappings for the whole plugin.

use crate::core::node::NodeMetadata;
use crate::core::port::{ParameterDefinition, PortDefinition, UiHint};
use crate::core::types::PortType;
use crate::filters::registry::FilterRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One input declaration: host type name plus widget options.
pub type InputEntry = (String, InputOptions);

/// Widget options for one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputOptions {
    /// Default widget value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Value>,
    /// Upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Value>,
    /// Increment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<serde_json::Value>,
    /// Text widget line mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    /// Widget style, e.g. `slider`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Inputs split the way the host expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    /// Inputs the host must connect or set
    pub required: IndexMap<String, InputEntry>,
    /// Inputs that may be left unset
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub optional: IndexMap<String, InputEntry>,
}

/// Registration schema for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSchema {
    /// Node class name
    pub name: String,
    /// Menu label
    pub display_name: String,
    /// One-line summary
    pub description: String,
    /// Host menu path
    pub category: String,
    /// Input declarations
    pub input: InputSchema,
    /// Output type names
    pub output: Vec<String>,
    /// Output names, aligned with `output`
    pub output_name: Vec<String>,
}

/// Everything the host needs to register the plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostManifest {
    /// Per-node schemas in registration order
    pub nodes: Vec<NodeSchema>,
    /// Class name to node class
    pub node_class_mappings: IndexMap<String, String>,
    /// Class name to display name
    pub node_display_name_mappings: IndexMap<String, String>,
}

impl NodeSchema {
    /// Build the schema for one descriptor.
    pub fn from_metadata(metadata: &NodeMetadata) -> Self {
        let mut input = InputSchema::default();

        for port in &metadata.inputs {
            let target = if port.optional { &mut input.optional } else { &mut input.required };
            target.insert(port.name.clone(), port_entry(port));
        }
        for param in &metadata.parameters {
            let target = if param.optional { &mut input.optional } else { &mut input.required };
            target.insert(param.name.clone(), parameter_entry(param));
        }

        Self {
            name: metadata.id.clone(),
            display_name: metadata.name.clone(),
            description: metadata.description.clone(),
            category: metadata.category.host_path().to_string(),
            input,
            output: metadata
                .outputs
                .iter()
                .map(|p| p.port_type.host_name().to_string())
                .collect(),
            output_name: metadata.outputs.iter().map(|p| p.name.clone()).collect(),
        }
    }
}

impl HostManifest {
    /// Build the manifest for every node in a registry, in registration order.
    pub fn from_registry(registry: &FilterRegistry) -> Self {
        let mut manifest = Self::default();
        for (id, entry) in registry.filters() {
            manifest.nodes.push(NodeSchema::from_metadata(&entry.metadata));
            manifest.node_class_mappings.insert(id.to_string(), id.to_string());
            manifest
                .node_display_name_mappings
                .insert(id.to_string(), entry.metadata.name.clone());
        }
        manifest
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn port_entry(port: &PortDefinition) -> InputEntry {
    (port.port_type.host_name().to_string(), InputOptions::default())
}

fn parameter_entry(param: &ParameterDefinition) -> InputEntry {
    let number = |v: f64| host_number(&param.param_type, v);
    let (multiline, display) = match &param.ui_hint {
        UiHint::Default => (None, None),
        UiHint::Slider => (None, Some("slider".to_string())),
        UiHint::BatchEditor => (Some(false), None),
    };

    let options = InputOptions {
        default: Some(param.default_value.to_json()),
        min: param.min().map(number),
        max: param.max().map(number),
        step: param.step().map(number),
        multiline,
        display,
    };
    (param.param_type.host_name().to_string(), options)
}

/// Integer parameters carry integer bounds.
fn host_number(param_type: &PortType, value: f64) -> serde_json::Value {
    match param_type {
        PortType::Integer => serde_json::Value::from(value.round() as i64),
        _ => serde_json::Value::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest_json() -> serde_json::Value {
        let manifest = HostManifest::from_registry(&FilterRegistry::with_builtins());
        serde_json::from_str(&manifest.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_mappings() {
        let json = manifest_json();
        assert_eq!(json["node_display_name_mappings"]["ImageBatchTrim"], "Trim Image Batch");
        assert_eq!(json["node_display_name_mappings"]["CreateImageBatch"], "Create Image Batch");
        assert_eq!(
            json["node_display_name_mappings"]["ImageBatchSelectByMask"],
            "Select Image Batch by Mask"
        );
        assert_eq!(json["node_class_mappings"]["CreateImageBatch"], "CreateImageBatch");
    }

    #[test]
    fn test_trim_schema() {
        let json = manifest_json();
        let trim = &json["nodes"][0];
        assert_eq!(trim["name"], "ImageBatchTrim");
        assert_eq!(trim["category"], "woz/Image/Batch");
        assert_eq!(trim["input"]["required"]["images"], json!(["IMAGE", {}]));
        assert_eq!(
            trim["input"]["required"]["start_index"],
            json!(["INT", {"default": 0, "min": 0, "max": 9998, "step": 1}])
        );
        assert_eq!(trim["output"], json!(["IMAGE"]));
        assert_eq!(trim["output_name"], json!(["trimmed_images"]));
        assert!(trim["input"].get("optional").is_none());
    }

    #[test]
    fn test_create_schema() {
        let json = manifest_json();
        let create = &json["nodes"][1];
        assert_eq!(
            create["input"]["required"]["image_data"],
            json!(["STRING", {"default": "[]", "multiline": false}])
        );
        assert_eq!(create["input"]["required"]["width"][1]["step"], 8);
    }

    #[test]
    fn test_select_schema_has_optional_slider() {
        let json = manifest_json();
        let select = &json["nodes"][2];
        assert_eq!(
            select["input"]["optional"]["threshold"],
            json!(["FLOAT", {"default": 0.5, "min": 0.0, "max": 1.0, "step": 0.01, "display": "slider"}])
        );
        let required: Vec<_> = select["input"]["required"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(required.len(), 3);
        assert_eq!(select["output_name"], json!(["selected_images"]));
    }
}
