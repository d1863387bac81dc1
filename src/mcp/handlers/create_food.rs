//! Handler for the `create_food_variant` tool.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::{
    FoodTools, ToolError, parse_arguments, require_non_empty, require_positive_serving,
    structured,
};
use crate::sparkyfitness::{CreateFoodRequest, CreatedFood, NutritionFacts};

/// Glycemic index label the backend expects when none is known.
const UNKNOWN_GLYCEMIC_INDEX: &str = "None";

/// Arguments accepted by `create_food_variant`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateFoodArgs {
    /// Food name.
    pub name: String,
    /// Brand name (optional).
    #[serde(default)]
    pub brand: Option<String>,
    /// Numeric serving size amount (e.g. 100, 1); must be greater than 0.
    pub serving_size: f64,
    /// Unit of measurement (e.g. g, ml, cup, piece).
    pub serving_unit: String,
    /// Nutrients per serving.
    #[serde(flatten)]
    pub nutrition: NutritionFacts,
    /// Mark as quick food (default: false).
    #[serde(default)]
    pub is_quick_food: Option<bool>,
    /// Glycemic index if available.
    #[serde(default)]
    pub glycemic_index: Option<String>,
}

/// Result of `create_food_variant`.
#[derive(Clone, Debug, Serialize, JsonSchema)]
pub struct CreateFoodOutput {
    /// ID of the created food.
    pub food_id: String,
    /// ID of the created default variant.
    pub variant_id: String,
    /// Success message.
    pub message: String,
}

impl CreateFoodArgs {
    /// Validate the arguments and build the backend payload for a new custom food.
    ///
    /// The first variant of a food is always its default.
    fn into_request(self) -> Result<CreateFoodRequest, ToolError> {
        require_non_empty("name", &self.name)?;
        require_positive_serving(self.serving_size)?;
        require_non_empty("serving_unit", &self.serving_unit)?;

        Ok(CreateFoodRequest {
            name: self.name,
            brand: self.brand.unwrap_or_default(),
            is_custom: true,
            is_quick_food: self.is_quick_food.unwrap_or(false),
            serving_size: self.serving_size,
            serving_unit: self.serving_unit,
            nutrition: self.nutrition,
            is_default: true,
            glycemic_index: self
                .glycemic_index
                .unwrap_or_else(|| UNKNOWN_GLYCEMIC_INDEX.to_string()),
            custom_nutrients: Map::new(),
        })
    }
}

fn display_name(food: &CreatedFood) -> String {
    match food.brand.as_deref() {
        Some(brand) if !brand.is_empty() => format!("{} ({brand})", food.name),
        _ => food.name.clone(),
    }
}

impl FoodTools {
    /// Create a new custom food with its default variant.
    pub async fn create_food_variant(
        &self,
        args: CreateFoodArgs,
    ) -> Result<CreateFoodOutput, ToolError> {
        let request = args.into_request()?;
        let created = self.api.create_food(&request).await?;

        tracing::info!(
            food_id = %created.id,
            variant_id = %created.default_variant.id,
            "create_food_variant completed"
        );

        Ok(CreateFoodOutput {
            message: format!(
                "Successfully created new food '{}' with default variant",
                display_name(&created)
            ),
            food_id: created.id,
            variant_id: created.default_variant.id,
        })
    }
}

/// Handle the `create_food_variant` tool.
pub(crate) async fn handle_create_food_variant(
    tools: &FoodTools,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: CreateFoodArgs = parse_arguments(arguments)?;
    let output = tools.create_food_variant(args).await?;
    structured(&output)
}
