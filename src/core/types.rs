//! Core value types that flow through node ports.
//!
//! The set of values a batch node can receive or produce is closed, so it is
//! an enum: exhaustive matching catches missing cases at compile time and
//! serde handles the parameter variants natively.

use crate::core::batch::ImageBatch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Values that can be passed to and from nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Batch of images, `[item, row, col, channel]`
    #[serde(skip)]
    Batch(ImageBatch),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
}

/// RGBA color value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Port types for type checking values against node descriptors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind")]
pub enum PortType {
    /// Opaque batch-of-images handle
    Image,
    Integer,
    Float,
    String,
}

// ============================================================================
// Value Implementation
// ============================================================================

impl Value {
    /// Get the port type of this value.
    pub fn get_type(&self) -> PortType {
        match self {
            Value::Batch(_) => PortType::Image,
            Value::Integer(_) => PortType::Integer,
            Value::Float(_) => PortType::Float,
            Value::String(_) => PortType::String,
        }
    }

    /// Try to get this value as a batch reference.
    pub fn as_batch(&self) -> Option<&ImageBatch> {
        if let Value::Batch(batch) = self {
            Some(batch)
        } else {
            None
        }
    }

    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Convert to JSON for schema export. Batches have no JSON form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::from(s.as_str()),
            Value::Batch(_) => serde_json::Value::Null,
        }
    }
}

impl From<ImageBatch> for Value {
    fn from(batch: ImageBatch) -> Self {
        Value::Batch(batch)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Batch(batch) => {
                let (h, w, c) = batch.item_shape();
                write!(f, "Batch[{}]({}x{}x{})", batch.len(), h, w, c)
            }
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{:.4}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

// ============================================================================
// PortType Implementation
// ============================================================================

impl PortType {
    /// Check if a value matches this port type.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (PortType::Image, Value::Batch(_)) => true,
            (PortType::Integer, Value::Integer(_)) => true,
            (PortType::Float, Value::Float(_)) => true,
            // Integer can be used where float is expected (implicit conversion)
            (PortType::Float, Value::Integer(_)) => true,
            (PortType::String, Value::String(_)) => true,
            _ => false,
        }
    }

    /// Type name the host uses in its registration schema.
    pub fn host_name(&self) -> &'static str {
        match self {
            PortType::Image => "IMAGE",
            PortType::Integer => "INT",
            PortType::Float => "FLOAT",
            PortType::String => "STRING",
        }
    }

    /// Get a human-readable name for this type.
    pub fn display_name(&self) -> &'static str {
        match self {
            PortType::Image => "Image",
            PortType::Integer => "Integer",
            PortType::Float => "Float",
            PortType::String => "String",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB components (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color string.
    ///
    /// Supports formats: "#RGB", "#RGBA", "#RRGGBB", "#RRGGBBAA". The leading
    /// `#` is optional.
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let hex = hex.trim();
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid hex color '{}': non-hex characters", hex));
        }

        let nibble = |i: usize| -> Result<u8, String> {
            u8::from_str_radix(&digits[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|e| e.to_string())
        };
        let byte = |i: usize| -> Result<u8, String> {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| e.to_string())
        };

        match digits.len() {
            3 => Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            n => Err(format!(
                "Invalid hex color format: expected 3, 4, 6, or 8 characters, got {}",
                n
            )),
        }
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// RGB components normalized to `[0, 1]`.
    pub fn to_normalized_rgb(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Common colors
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_type_matching() {
        assert!(PortType::Integer.matches(&Value::Integer(42)));
        assert!(PortType::Float.matches(&Value::Float(0.5)));
        assert!(PortType::Float.matches(&Value::Integer(42))); // Implicit conversion
        assert!(!PortType::Integer.matches(&Value::Float(0.5))); // No downcast
        assert!(PortType::Image.matches(&Value::Batch(ImageBatch::empty(2, 2, 3))));
        assert!(!PortType::Image.matches(&Value::String("x".to_string())));
    }

    #[test]
    fn test_host_names() {
        assert_eq!(PortType::Image.host_name(), "IMAGE");
        assert_eq!(PortType::Integer.host_name(), "INT");
        assert_eq!(PortType::Float.host_name(), "FLOAT");
        assert_eq!(PortType::String.host_name(), "STRING");
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#FF0000").unwrap(), Color::RED);
        assert_eq!(Color::from_hex("#ff00ff").unwrap(), Color::MAGENTA);
        assert_eq!(Color::from_hex("#00FF00FF").unwrap(), Color::new(0, 255, 0, 255));
        assert_eq!(Color::from_hex("F00").unwrap(), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_color_from_hex_rejects_garbage() {
        assert!(Color::from_hex("red").is_err());
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!(Color::from_hex("").is_err());
        // multi-byte characters must not panic on slicing
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_color_to_hex() {
        assert_eq!(Color::RED.to_hex(), "#FF0000");
        assert_eq!(Color::new(0, 255, 0, 128).to_hex(), "#00FF0080");
    }

    #[test]
    fn test_color_normalized() {
        assert_eq!(Color::RED.to_normalized_rgb(), [1.0, 0.0, 0.0]);
        assert_eq!(Color::BLACK.to_normalized_rgb(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_value_type_inference() {
        assert_eq!(Value::Integer(42).get_type(), PortType::Integer);
        assert_eq!(Value::Float(0.5).get_type(), PortType::Float);
        assert_eq!(Value::Batch(ImageBatch::empty(1, 1, 3)).get_type(), PortType::Image);
        assert_eq!(Value::Integer(7).to_json(), serde_json::json!(7));
    }
}
