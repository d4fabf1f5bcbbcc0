//! Node registry for managing available node types.

use crate::config::Config;
use crate::core::node::{Category, FilterNode, NodeMetadata};
use indexmap::IndexMap;
use std::sync::Arc;

/// Factory function for creating node instances.
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn FilterNode> + Send + Sync>;

/// Registry entry containing metadata and factory.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Factory function to create instances.
    pub factory: FilterFactory,
    /// Cached metadata (avoids creating instance just to get metadata).
    pub metadata: NodeMetadata,
}

/// Registry for all available node types.
///
/// Keeps registration order, which is also the order the host lists the
/// nodes in.
pub struct FilterRegistry {
    /// Nodes indexed by their class name.
    filters: IndexMap<String, RegistryEntry>,
}

impl FilterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            filters: IndexMap::new(),
        }
    }

    /// Create a registry with the built-in nodes and default configuration.
    pub fn with_builtins() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create a registry with the built-in nodes configured from `config`.
    pub fn with_config(config: &Config) -> Self {
        let mut registry = Self::new();
        crate::filters::builtin::register_all(&mut registry, config);
        registry
    }

    /// Register a node type. A later registration with the same id replaces
    /// the earlier one and keeps its position.
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn FilterNode> + Send + Sync + 'static,
    {
        // Create a temporary instance to get metadata
        let metadata = factory().metadata();
        let id = metadata.id.clone();

        let entry = RegistryEntry {
            factory: Arc::new(factory),
            metadata,
        };

        if self.filters.insert(id.clone(), entry).is_some() {
            log::debug!("Replaced node registration '{}'", id);
        }
    }

    /// Create a new instance of a node by id.
    pub fn create(&self, id: &str) -> Option<Box<dyn FilterNode>> {
        self.filters.get(id).map(|e| (e.factory)())
    }

    /// Get metadata for a node without creating an instance.
    pub fn get_metadata(&self, id: &str) -> Option<&NodeMetadata> {
        self.filters.get(id).map(|e| &e.metadata)
    }

    /// Check if a node is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.filters.contains_key(id)
    }

    /// All registered nodes, in registration order.
    pub fn filters(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get the total number of registered nodes.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Nodes grouped by category for display, each group sorted by name.
    pub fn grouped_by_category(&self) -> IndexMap<Category, Vec<&NodeMetadata>> {
        let mut grouped: IndexMap<Category, Vec<&NodeMetadata>> = IndexMap::new();

        for entry in self.filters.values() {
            grouped
                .entry(entry.metadata.category)
                .or_default()
                .push(&entry.metadata);
        }

        for nodes in grouped.values_mut() {
            nodes.sort_by(|a, b| a.name.cmp(&b.name));
        }

        grouped
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ExecutionContext;
    use crate::core::error::ExecutionError;

    #[derive(Clone)]
    struct Passthrough;

    impl FilterNode for Passthrough {
        fn metadata(&self) -> NodeMetadata {
            NodeMetadata::builder("Passthrough", "Passthrough")
                .description("Does nothing")
                .build()
        }

        fn execute(&self, _ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
            Ok(())
        }

        fn clone_box(&self) -> Box<dyn FilterNode> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_builtins_in_order() {
        let registry = FilterRegistry::with_builtins();
        let ids: Vec<_> = registry.filters().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["ImageBatchTrim", "CreateImageBatch", "ImageBatchSelectByMask"]);
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = FilterRegistry::new();
        assert!(registry.is_empty());
        registry.register(|| Box::new(Passthrough));

        assert!(registry.contains("Passthrough"));
        assert!(registry.create("Passthrough").is_some());
        assert!(registry.create("Missing").is_none());
        assert_eq!(registry.get_metadata("Passthrough").map(|m| m.name.as_str()), Some("Passthrough"));
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = FilterRegistry::new();
        registry.register(|| Box::new(Passthrough));
        registry.register(|| Box::new(Passthrough));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Passthrough"));
    }

    #[test]
    fn test_grouped_by_category() {
        let registry = FilterRegistry::with_builtins();

        let grouped = registry.grouped_by_category();
        let batch: Vec<_> = grouped[&Category::Batch].iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            batch,
            vec!["Create Image Batch", "Select Image Batch by Mask", "Trim Image Batch"]
        );
        assert_eq!(grouped.len(), 1);
    }
}
