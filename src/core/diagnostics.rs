//! Diagnostics channel for non-fatal conditions.
//!
//! Nodes never hard-fail on bad documents, missing files or uneven batches.
//! They substitute a placeholder and record what happened here instead. Each
//! record is kept (so callers and tests can inspect it) and forwarded to the
//! `log` facade under the channel's target.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of degradation a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Top-level item document could not be parsed
    MalformedDocument,
    /// Item list length differs from the requested batch size
    SizeMismatch,
    /// A file item has no file name
    MissingFile,
    /// A file item could not be resolved, opened or decoded
    LoadFailure,
    /// A color item holds an unparseable color
    InvalidColor,
    /// An item has an unknown or malformed type
    UnknownItem,
    /// The operation produced an empty batch
    EmptyResult,
    /// Input batches have different lengths
    LengthMismatch,
    /// Input batches have different item shapes
    ShapeMismatch,
}

impl DiagnosticKind {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::MalformedDocument => "malformed document",
            DiagnosticKind::SizeMismatch => "size mismatch",
            DiagnosticKind::MissingFile => "missing file",
            DiagnosticKind::LoadFailure => "load failure",
            DiagnosticKind::InvalidColor => "invalid color",
            DiagnosticKind::UnknownItem => "unknown item",
            DiagnosticKind::EmptyResult => "empty result",
            DiagnosticKind::LengthMismatch => "length mismatch",
            DiagnosticKind::ShapeMismatch => "shape mismatch",
        }
    }
}

/// A single recorded warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Category of the condition.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// Batch item the warning refers to, if any.
    pub item: Option<usize>,
}

impl Diagnostic {
    /// Create a diagnostic that is not tied to an item.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            item: None,
        }
    }

    /// Attach an item index.
    pub fn for_item(mut self, index: usize) -> Self {
        self.item = Some(index);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item {
            Some(index) => write!(f, "[{}] item {}: {}", self.kind.label(), index, self.message),
            None => write!(f, "[{}] {}", self.kind.label(), self.message),
        }
    }
}

/// Collects diagnostics for one node invocation.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    target: String,
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty channel that logs under `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            records: Vec::new(),
        }
    }

    /// Change the name records are logged under.
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    /// Record a warning and forward it to the logger.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Diagnostic::new(kind, message));
    }

    /// Record a prepared diagnostic and forward it to the logger.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!(target: "image_batch_utils", "{}: {}", self.target, diagnostic);
        self.records.push(diagnostic);
    }

    /// Log an informational summary. Not recorded.
    pub fn info(&self, message: impl AsRef<str>) {
        log::info!(target: "image_batch_utils", "{}: {}", self.target, message.as_ref());
    }

    /// All recorded diagnostics, in order.
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Take the recorded diagnostics, leaving the channel empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records)
    }

    /// Check whether any diagnostic of `kind` was recorded.
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.records.iter().any(|d| d.kind == kind)
    }

    /// Number of diagnostics of `kind`.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.records.iter().filter(|d| d.kind == kind).count()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new("node")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut diag = Diagnostics::new("test");
        diag.warn(DiagnosticKind::SizeMismatch, "padded");
        diag.push(Diagnostic::new(DiagnosticKind::MissingFile, "no name").for_item(2));

        assert_eq!(diag.len(), 2);
        assert!(diag.has(DiagnosticKind::MissingFile));
        assert!(!diag.has(DiagnosticKind::LoadFailure));
        assert_eq!(diag.records()[1].item, Some(2));
        assert_eq!(diag.count(DiagnosticKind::SizeMismatch), 1);
    }

    #[test]
    fn test_info_is_not_recorded() {
        let diag = Diagnostics::new("test");
        diag.info("all good");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_take_drains() {
        let mut diag = Diagnostics::default();
        diag.warn(DiagnosticKind::EmptyResult, "nothing");
        let taken = diag.take();
        assert_eq!(taken.len(), 1);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::new(DiagnosticKind::LoadFailure, "boom").for_item(3);
        assert_eq!(d.to_string(), "[load failure] item 3: boom");
    }
}
