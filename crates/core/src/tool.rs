//! Tool trait: the abstraction over plugin capabilities.
//!
//! Every endpoint of a compiled plugin becomes exactly one [`Tool`]. The
//! model addresses tools by name; a tool takes the raw `Action Input` text
//! and always answers with an observation string, never an error.

use crate::error::ToolError;
use async_trait::async_trait;
use std::sync::Arc;

/// The core Tool trait.
///
/// Implementations close over whatever configuration they need (endpoint,
/// parameter location, HTTP client) at compile time.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (the endpoint's operation id).
    fn name(&self) -> &str;

    /// A description of the tool, rendered into the prompt.
    fn description(&self) -> &str;

    /// Invoke the tool with the model-provided input.
    ///
    /// Failures are reported inside the returned observation.
    async fn call(&self, input: &str) -> String;
}

/// An ordered set of tools with unique names.
///
/// Registration order is preserved: resolution walks tools in this order
/// and takes the first sufficiently similar name.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Fails if a tool with the same name already exists.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        if self.get(tool.name()).is_some() {
            return Err(ToolError::Duplicate(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Iterate tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    /// All tool names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet").field("tools", &self.names()).finish()
    }
}
