//! Per-item specs for the batch creator, and the editing model that
//! maintains the `image_data` document.
//!
//! The document is a JSON array of `{"type": "color", "value": "#RRGGBB"}`
//! and `{"type": "file", "value": "<name>"}` objects. Decoding is lenient:
//! each element is decoded on its own, and anything that is not a
//! well-formed item still yields a spec.

use crate::core::diagnostics::{DiagnosticKind, Diagnostics};
use crate::core::types::Color;
use serde::{Deserialize, Serialize};

/// Hex value used for padding and for color items without a usable value.
pub const DEFAULT_COLOR_HEX: &str = "#000000";

/// What one batch item should contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum BatchItemSpec {
    /// Solid fill with a hex color.
    Color(String),
    /// Image file, by host file name.
    File(String),
    /// Anything that is not a color or file item.
    #[serde(skip)]
    Unknown,
}

impl BatchItemSpec {
    /// The padding spec: solid black.
    pub fn black() -> Self {
        BatchItemSpec::Color(DEFAULT_COLOR_HEX.to_string())
    }

    /// Decode one element of the document.
    ///
    /// A `color` item with a missing or non-string value becomes black, a
    /// `file` item with a missing or null value gets an empty name, and
    /// anything else (including a `file` value of another type) is
    /// [`BatchItemSpec::Unknown`].
    pub fn from_json_value(value: &serde_json::Value) -> Self {
        if let Ok(spec) = serde_json::from_value::<BatchItemSpec>(value.clone()) {
            return spec;
        }
        match value.get("type").and_then(serde_json::Value::as_str) {
            Some("color") => Self::black(),
            Some("file") => match value.get("value") {
                None | Some(serde_json::Value::Null) => BatchItemSpec::File(String::new()),
                Some(_) => BatchItemSpec::Unknown,
            },
            _ => BatchItemSpec::Unknown,
        }
    }

    /// Type tag as written in the document.
    pub fn kind(&self) -> &'static str {
        match self {
            BatchItemSpec::Color(_) => "color",
            BatchItemSpec::File(_) => "file",
            BatchItemSpec::Unknown => "unknown",
        }
    }
}

impl Default for BatchItemSpec {
    fn default() -> Self {
        Self::black()
    }
}

/// Parse an `image_data` document into item specs.
///
/// Returns `None` (after a [`DiagnosticKind::MalformedDocument`] warning)
/// when the text is not JSON or the top level is not an array.
pub fn parse_item_specs(document: &str, diagnostics: &mut Diagnostics) -> Option<Vec<BatchItemSpec>> {
    let parsed: serde_json::Value = match serde_json::from_str(document) {
        Ok(parsed) => parsed,
        Err(e) => {
            diagnostics.warn(
                DiagnosticKind::MalformedDocument,
                format!("Error parsing image_data JSON: {}", e),
            );
            return None;
        }
    };

    match parsed {
        serde_json::Value::Array(elements) => {
            Some(elements.iter().map(BatchItemSpec::from_json_value).collect())
        }
        other => {
            diagnostics.warn(
                DiagnosticKind::MalformedDocument,
                format!("image_data must be a JSON array, got {}", json_kind(&other)),
            );
            None
        }
    }
}

/// Truncate or pad with black so exactly `batch_size` specs remain.
pub fn reconcile_specs(mut specs: Vec<BatchItemSpec>, batch_size: usize) -> Vec<BatchItemSpec> {
    specs.resize_with(batch_size, BatchItemSpec::black);
    specs
}

/// Editing model for the `image_data` document.
///
/// Mirrors the host's batch editor widget: a list of specs kept at the node's
/// batch size, and an optional selected item that color/file edits apply to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSpecEditor {
    items: Vec<BatchItemSpec>,
    selected: Option<usize>,
}

impl BatchSpecEditor {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document. Malformed documents load as an empty list.
    pub fn from_json(document: &str) -> Self {
        let items = match serde_json::from_str::<serde_json::Value>(document) {
            Ok(serde_json::Value::Array(elements)) => elements
                .iter()
                .map(BatchItemSpec::from_json_value)
                .map(|spec| match spec {
                    BatchItemSpec::Unknown => BatchItemSpec::black(),
                    other => other,
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            items,
            selected: None,
        }
    }

    /// Truncate or pad with black to exactly `batch_size` items.
    ///
    /// A selection past the new end is cleared.
    pub fn reconcile(&mut self, batch_size: usize) {
        self.items = reconcile_specs(std::mem::take(&mut self.items), batch_size);
        if self.selected.is_some_and(|index| index >= self.items.len()) {
            self.selected = None;
        }
    }

    /// Select an item. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = Some(index);
        }
    }

    /// Currently selected index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Replace the selected item with a color.
    ///
    /// The color is stored normalized (`#RRGGBB`, or `#RRGGBBAA` with alpha).
    /// Does nothing without a selection.
    pub fn set_color(&mut self, hex: &str) -> Result<(), String> {
        let color = Color::from_hex(hex)?;
        if let Some(slot) = self.selected_slot() {
            *slot = BatchItemSpec::Color(color.to_hex());
        }
        Ok(())
    }

    /// Replace the selected item with a file. Does nothing without a selection.
    pub fn set_file(&mut self, name: impl Into<String>) {
        if let Some(slot) = self.selected_slot() {
            *slot = BatchItemSpec::File(name.into());
        }
    }

    /// Current items.
    pub fn items(&self) -> &[BatchItemSpec] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize back to an `image_data` document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    fn selected_slot(&mut self) -> Option<&mut BatchItemSpec> {
        self.selected.and_then(|index| self.items.get_mut(index))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_well_formed_items() {
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "color", "value": "#FF0000"})),
            BatchItemSpec::Color("#FF0000".to_string())
        );
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "file", "value": "cat.png [output]"})),
            BatchItemSpec::File("cat.png [output]".to_string())
        );
    }

    #[test]
    fn test_decode_lenient_items() {
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "color"})),
            BatchItemSpec::black()
        );
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "color", "value": 7})),
            BatchItemSpec::black()
        );
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "file", "value": null})),
            BatchItemSpec::File(String::new())
        );
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "file"})),
            BatchItemSpec::File(String::new())
        );
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "file", "value": 5})),
            BatchItemSpec::Unknown
        );
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "gradient", "value": "x"})),
            BatchItemSpec::Unknown
        );
        assert_eq!(BatchItemSpec::from_json_value(&json!(42)), BatchItemSpec::Unknown);
        assert_eq!(
            BatchItemSpec::from_json_value(&json!({"type": "unknown"})),
            BatchItemSpec::Unknown
        );
    }

    #[test]
    fn test_parse_document() {
        let mut diag = Diagnostics::new("test");
        let specs = parse_item_specs(r##"[{"type":"color","value":"#fff"}, "junk"]"##, &mut diag).unwrap();
        assert_eq!(specs, vec![BatchItemSpec::Color("#fff".to_string()), BatchItemSpec::Unknown]);
        assert!(diag.is_empty());

        assert!(parse_item_specs("not json", &mut diag).is_none());
        assert!(parse_item_specs(r#"{"type":"color"}"#, &mut diag).is_none());
        assert_eq!(diag.count(DiagnosticKind::MalformedDocument), 2);
    }

    #[test]
    fn test_reconcile_specs() {
        let specs = vec![BatchItemSpec::File("a.png".to_string())];
        let padded = reconcile_specs(specs.clone(), 3);
        assert_eq!(padded.len(), 3);
        assert_eq!(padded[2], BatchItemSpec::black());

        assert_eq!(reconcile_specs(padded, 1), specs);
    }

    #[test]
    fn test_editor_load_and_reconcile() {
        let mut editor =
            BatchSpecEditor::from_json(r#"[{"type":"file","value":"a.png"},{"type":"mystery"}]"#);
        assert_eq!(editor.len(), 2);
        assert_eq!(editor.items()[1], BatchItemSpec::black());

        editor.reconcile(4);
        assert_eq!(editor.len(), 4);

        editor.select(3);
        editor.reconcile(2);
        assert_eq!(editor.len(), 2);
        assert_eq!(editor.selected(), None);

        assert!(BatchSpecEditor::from_json("{broken").is_empty());
        assert!(BatchSpecEditor::from_json(r#""a string""#).is_empty());
    }

    #[test]
    fn test_editor_edits_only_selection() {
        let mut editor = BatchSpecEditor::new();
        editor.reconcile(3);

        editor.set_color("#FF0000").unwrap();
        editor.set_file("ignored.png");
        assert!(editor.items().iter().all(|s| *s == BatchItemSpec::black()));

        editor.select(7);
        assert_eq!(editor.selected(), None);

        editor.select(1);
        editor.set_color("0f0").unwrap();
        assert_eq!(editor.items()[1], BatchItemSpec::Color("#00FF00".to_string()));
        assert!(editor.set_color("chartreuse").is_err());
        assert_eq!(editor.items()[1], BatchItemSpec::Color("#00FF00".to_string()));

        editor.select(2);
        editor.set_file("dog.png");
        assert_eq!(editor.items()[2], BatchItemSpec::File("dog.png".to_string()));
        assert_eq!(editor.items()[0], BatchItemSpec::black());
    }

    #[test]
    fn test_editor_json_round_trip() {
        let mut editor = BatchSpecEditor::new();
        editor.reconcile(2);
        editor.select(0);
        editor.set_file("cat.png");

        let document = editor.to_json().unwrap();
        assert_eq!(
            document,
            r##"[{"type":"file","value":"cat.png"},{"type":"color","value":"#000000"}]"##
        );

        let reloaded = BatchSpecEditor::from_json(&document);
        assert_eq!(reloaded.items(), editor.items());
    }
}
