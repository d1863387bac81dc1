//! MCP server bootstrap and request dispatch.

use std::{borrow::Cow, sync::Arc};

use crate::{
    mcp::{
        handlers::{
            FoodTools, add_variant::handle_add_food_variant,
            create_food::handle_create_food_variant, search::handle_search_foods,
        },
        registry, schemas,
    },
    sparkyfitness::FitnessApi,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, ListToolsResult, ServerCapabilities, ServerInfo,
        Tool, ToolAnnotations,
    },
};

pub(crate) const SEARCH_FOODS: &str = "search_foods";
pub(crate) const ADD_FOOD_VARIANT: &str = "add_food_variant";
pub(crate) const CREATE_FOOD_VARIANT: &str = "create_food_variant";

const ADD_FOOD_VARIANT_DESCRIPTION: &str = "Add a new serving size variant to an EXISTING food in SparkyFitness.

When to use: search_foods found a matching food AND the user wants another serving size on that same food rather than a separate entry.

Required: food_id (from search_foods), serving_size (> 0), serving_unit (g, ml, cup, piece, oz, ...), and the core macros calories, protein, carbs, fat. Optional: fiber, sugars, fats breakdown, vitamins, minerals, is_default, glycemic_index.

Example: search_foods(name='Enoki Mushroom') finds food_id='abc-123' with a 100g variant; after the user confirms, add_food_variant(food_id='abc-123', serving_size=150, serving_unit='g', ...) leaves the food with both a 100g and a 150g variant.";

const CREATE_FOOD_VARIANT_DESCRIPTION: &str = "Create a NEW food entry with its default variant in SparkyFitness.

When to use: ONLY when search_foods found no matches, or the user explicitly chooses a separate entry despite duplicates. To add a serving size to an existing food use add_food_variant instead.

Required: name, serving_size (> 0), serving_unit, and the core macros calories, protein, carbs, fat. Optional: brand, additional nutrients, is_quick_food, glycemic_index.

The food is created as a custom food and its first variant becomes the default. If search_foods returned candidates, show them to the user first and ask whether to extend one of them or create a new entry.";

/// MCP server implementation exposing SparkyFitness food tools.
#[derive(Clone)]
pub struct SparkyFitnessMcpServer {
    tools: Arc<FoodTools>,
    registry: Arc<registry::Registry>,
}

impl SparkyFitnessMcpServer {
    /// Create a new MCP server whose tools call the supplied backend client.
    pub fn new(api: Arc<dyn FitnessApi>) -> Self {
        let mut registry = registry::Registry::new();
        registry.register_tool(SEARCH_FOODS, tool_search_foods);
        registry.register_tool(ADD_FOOD_VARIANT, tool_add_food_variant);
        registry.register_tool(CREATE_FOOD_VARIANT, tool_create_food_variant);
        tracing::debug!(
            tools = ?registry.tool_names().collect::<Vec<_>>(),
            "Registered MCP tools"
        );

        Self {
            tools: Arc::new(FoodTools::new(api)),
            registry: Arc::new(registry),
        }
    }

    fn describe_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: Cow::Borrowed(SEARCH_FOODS),
                title: Some("Search Foods".to_string()),
                description: Some(Cow::Borrowed(
                    "Search for foods in the SparkyFitness database by name and optional brand. Returns matching foods with their default nutrition information; run this before creating anything to avoid duplicates.",
                )),
                input_schema: Arc::new(schemas::search_foods_input_schema()),
                output_schema: Some(Arc::new(schemas::search_foods_output_schema())),
                annotations: Some(
                    ToolAnnotations::with_title("Search Foods")
                        .read_only(true)
                        .idempotent(true)
                        .open_world(true),
                ),
                icons: None,
            },
            Tool {
                name: Cow::Borrowed(ADD_FOOD_VARIANT),
                title: Some("Add Variant to Existing Food".to_string()),
                description: Some(Cow::Borrowed(ADD_FOOD_VARIANT_DESCRIPTION)),
                input_schema: Arc::new(schemas::add_food_variant_input_schema()),
                output_schema: Some(Arc::new(schemas::add_food_variant_output_schema())),
                annotations: Some(
                    ToolAnnotations::with_title("Add Variant to Existing Food")
                        .read_only(false)
                        .destructive(false)
                        .idempotent(false)
                        .open_world(true),
                ),
                icons: None,
            },
            Tool {
                name: Cow::Borrowed(CREATE_FOOD_VARIANT),
                title: Some("Create New Food Entry".to_string()),
                description: Some(Cow::Borrowed(CREATE_FOOD_VARIANT_DESCRIPTION)),
                input_schema: Arc::new(schemas::create_food_variant_input_schema()),
                output_schema: Some(Arc::new(schemas::create_food_variant_output_schema())),
                annotations: Some(
                    ToolAnnotations::with_title("Create New Food Entry")
                        .read_only(false)
                        .destructive(false)
                        .idempotent(false)
                        .open_world(true),
                ),
                icons: None,
            },
        ]
    }
}

fn tool_search_foods(
    server: &SparkyFitnessMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let tools = server.tools.clone();
    Box::pin(async move { handle_search_foods(&tools, request.arguments).await })
}

fn tool_add_food_variant(
    server: &SparkyFitnessMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let tools = server.tools.clone();
    Box::pin(async move { handle_add_food_variant(&tools, request.arguments).await })
}

fn tool_create_food_variant(
    server: &SparkyFitnessMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let tools = server.tools.clone();
    Box::pin(async move { handle_create_food_variant(&tools, request.arguments).await })
}

impl ServerHandler for SparkyFitnessMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = rmcp::model::Implementation::from_build_env();
        implementation.name = "sparkyfitness-mcp".to_string();
        implementation.title = Some("SparkyFitness MCP Server".to_string());
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: implementation,
            instructions: Some(
                "Use this server to look up and record food nutrition in SparkyFitness. Always search_foods first; extend an existing food with add_food_variant, and only create_food_variant when nothing suitable exists.".into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.describe_tools();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            if let Some(handler) = self.registry.tools.get(request.name.as_ref()) {
                tracing::debug!(tool = %request.name, "Dispatching tool call");
                return handler(self, request).await;
            }

            Err(McpError::invalid_params(
                format!("Unknown tool: {}", request.name),
                None,
            ))
        }
    }
}
