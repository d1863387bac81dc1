//! Name-to-handler table used by `call_tool` dispatch.

use std::{collections::HashMap, future::Future, pin::Pin};

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolRequestParam, CallToolResult};

use super::server::SparkyFitnessMcpServer;

/// Boxed future produced by a tool handler.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<CallToolResult, McpError>> + Send>>;

/// Entry point invoked for a single `tools/call` request.
pub type ToolHandler = fn(&SparkyFitnessMcpServer, CallToolRequestParam) -> ToolFuture;

/// Registry mapping tool names to handler functions.
#[derive(Default)]
pub struct Registry {
    /// Registered handlers keyed by tool name.
    pub tools: HashMap<&'static str, ToolHandler>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous handler for that name.
    pub fn register_tool(&mut self, name: &'static str, handler: ToolHandler) {
        self.tools.insert(name, handler);
    }

    /// Names of every registered tool, in no particular order.
    pub fn tool_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_result(_: &SparkyFitnessMcpServer, _: CallToolRequestParam) -> ToolFuture {
        Box::pin(async { Ok(CallToolResult::success(Vec::new())) })
    }

    #[test]
    fn registering_twice_keeps_one_entry_per_name() {
        let mut registry = Registry::new();
        assert_eq!(registry.tool_names().count(), 0);

        registry.register_tool("search_foods", empty_result);
        registry.register_tool("search_foods", empty_result);
        registry.register_tool("add_food_variant", empty_result);

        let mut names: Vec<_> = registry.tool_names().collect();
        names.sort_unstable();
        assert_eq!(names, ["add_food_variant", "search_foods"]);
        assert!(registry.tools.contains_key("search_foods"));
    }
}
