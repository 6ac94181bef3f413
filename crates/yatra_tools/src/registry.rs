//! Tool registry.
//!
//! The [`ToolRegistry`] is the closed set of tools a session may offer the
//! model. It is filled once at startup and then shared read-only behind an
//! [`Arc`].
//!
//! # Usage
//!
//! ```ignore
//! use yatra_tools::ToolRegistry;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(query_kb_tool)?;
//! let registry = Arc::new(registry);
//! ```

use crate::error::ToolError;
use crate::tool::Tool;
use indexmap::IndexMap;
use std::sync::Arc;
use yatra_models::llm::ToolDefinition;

/// Tools keyed by name, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl core::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Registers a tool under the name from its definition.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::AlreadyRegistered`] if the name is taken. Use
    /// [`replace`](Self::replace) to overwrite deliberately.
    pub fn register(&mut self, tool: impl Tool) -> Result<(), ToolError> {
        let name = tool.definition().name;
        if self.tools.contains_key(&name) {
            return Err(ToolError::AlreadyRegistered(name));
        }
        tracing::debug!(tool = %name, "registered tool");
        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    /// Registers a tool, overwriting any tool with the same name.
    ///
    /// An overwritten tool keeps its original position in the listing.
    /// Returns the previous tool, if any.
    pub fn replace(&mut self, tool: impl Tool) -> Option<Arc<dyn Tool>> {
        let name = tool.definition().name;
        let previous = self.tools.insert(name.clone(), Arc::new(tool));
        if previous.is_some() {
            tracing::debug!(tool = %name, "replaced tool");
        }
        previous
    }

    /// Looks up a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] if no tool has that name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::not_found(name))
    }

    /// Lazily yields the definitions advertised to the model, in registration
    /// order.
    pub fn list_for_prompt(&self) -> impl Iterator<Item = ToolDefinition> + '_ {
        self.tools.values().map(|tool| tool.definition())
    }

    /// Returns tool definitions for all registered tools.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list_for_prompt().collect()
    }

    /// Returns whether a tool with the given name is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the names of all registered tools.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
