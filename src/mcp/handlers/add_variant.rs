//! Handler for the `add_food_variant` tool.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    FoodTools, ToolError, parse_arguments, require_non_empty, require_positive_serving,
    structured,
};
use crate::sparkyfitness::{AddFoodVariantRequest, NutritionFacts};

/// Arguments accepted by `add_food_variant`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddFoodVariantArgs {
    /// Unique identifier of the existing food (from search_foods results).
    pub food_id: String,
    /// Numeric serving size amount (e.g. 100, 1.5); must be greater than 0.
    pub serving_size: f64,
    /// Unit of measurement (e.g. g, ml, cup, piece).
    pub serving_unit: String,
    /// Nutrients per serving.
    #[serde(flatten)]
    pub nutrition: NutritionFacts,
    /// Make this variant the food's default variant (default: false).
    #[serde(default)]
    pub is_default: Option<bool>,
    /// Glycemic index if available.
    #[serde(default)]
    pub glycemic_index: Option<String>,
}

/// Result of `add_food_variant`.
#[derive(Clone, Debug, Serialize, JsonSchema)]
pub struct AddFoodVariantOutput {
    /// ID of the food this variant was added to.
    pub food_id: String,
    /// ID of the newly created variant.
    pub variant_id: String,
    /// Success message.
    pub message: String,
}

impl AddFoodVariantArgs {
    /// Validate the arguments and build the backend payload.
    fn into_request(self) -> Result<AddFoodVariantRequest, ToolError> {
        require_non_empty("food_id", &self.food_id)?;
        require_positive_serving(self.serving_size)?;
        require_non_empty("serving_unit", &self.serving_unit)?;

        Ok(AddFoodVariantRequest {
            food_id: self.food_id,
            serving_size: self.serving_size,
            serving_unit: self.serving_unit,
            nutrition: self.nutrition,
            is_default: self.is_default.unwrap_or(false),
            glycemic_index: self.glycemic_index,
            custom_nutrients: None,
        })
    }
}

impl FoodTools {
    /// Attach a new serving-size variant to an existing food.
    pub async fn add_food_variant(
        &self,
        args: AddFoodVariantArgs,
    ) -> Result<AddFoodVariantOutput, ToolError> {
        let request = args.into_request()?;
        let created = self.api.add_food_variant(&request).await?;

        tracing::info!(
            food_id = %request.food_id,
            variant_id = %created.id,
            "add_food_variant completed"
        );

        Ok(AddFoodVariantOutput {
            message: format!(
                "Successfully added variant to existing food (variant ID: {})",
                created.id
            ),
            food_id: request.food_id,
            variant_id: created.id,
        })
    }
}

/// Handle the `add_food_variant` tool.
pub(crate) async fn handle_add_food_variant(
    tools: &FoodTools,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: AddFoodVariantArgs = parse_arguments(arguments)?;
    let output = tools.add_food_variant(args).await?;
    structured(&output)
}
