//! Handler for the `search_foods` tool.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{FoodTools, ToolError, parse_arguments, require_non_empty, structured};
use crate::sparkyfitness::{Food, MatchMode, NutritionFacts};

/// Number of results requested when the agent does not pass `limit`.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Arguments accepted by `search_foods`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchFoodsArgs {
    /// Food name to search for.
    pub name: String,
    /// Optional brand name; results are filtered to an exact, case-sensitive brand match.
    #[serde(default)]
    pub brand: Option<String>,
    /// Broad (partial) name matching when true, exact matching when false (default: true).
    #[serde(default)]
    pub broad_match: Option<bool>,
    /// Maximum number of results to request from the backend (default: 10).
    #[serde(default)]
    pub limit: Option<u32>,
}

/// A food together with the nutrition of its default variant.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct FoodResult {
    /// Unique identifier of the food.
    pub food_id: String,
    /// Name of the food.
    pub food_name: String,
    /// Brand name if available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Whether this is a user-created food.
    pub is_custom: bool,
    /// Provider the food was imported from (e.g. usda, nutritionix).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    /// Unique identifier of the default variant.
    pub variant_id: String,
    /// Serving size amount.
    pub serving_size: f64,
    /// Unit of measurement for the serving.
    pub serving_unit: String,
    /// Nutrients per serving.
    #[serde(flatten)]
    pub nutrition: NutritionFacts,
    /// Glycemic index if available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glycemic_index: Option<String>,
}

impl FoodResult {
    /// Flatten a backend food; foods without a default variant yield `None`.
    fn from_food(food: Food) -> Option<Self> {
        let variant = food.default_variant?;
        Some(Self {
            food_id: food.id,
            food_name: food.name,
            brand: food.brand,
            is_custom: food.is_custom,
            provider_type: food.provider_type,
            variant_id: variant.id,
            serving_size: variant.serving_size,
            serving_unit: variant.serving_unit,
            nutrition: variant.nutrition,
            glycemic_index: variant.glycemic_index,
        })
    }
}

/// Result of `search_foods`.
#[derive(Clone, Debug, Serialize, JsonSchema)]
pub struct SearchFoodsOutput {
    /// Matching foods with their default variants.
    pub foods: Vec<FoodResult>,
    /// Number of foods returned.
    pub total: usize,
}

impl FoodTools {
    /// Search the backend and return foods that expose a default variant.
    ///
    /// The brand filter runs locally after the backend call and is never sent upstream.
    pub async fn search_foods(&self, args: SearchFoodsArgs) -> Result<SearchFoodsOutput, ToolError> {
        require_non_empty("name", &args.name)?;

        let match_mode = MatchMode::from(args.broad_match.unwrap_or(true));
        let limit = args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let foods = self.api.search_foods(&args.name, match_mode, limit).await?;
        let returned = foods.len();

        let brand = args.brand.as_deref().filter(|brand| !brand.is_empty());
        let results: Vec<FoodResult> = foods
            .into_iter()
            .filter(|food| brand.is_none_or(|wanted| food.brand.as_deref() == Some(wanted)))
            .filter_map(FoodResult::from_food)
            .collect();

        tracing::info!(
            name = %args.name,
            ?match_mode,
            limit,
            returned,
            kept = results.len(),
            "search_foods completed"
        );

        Ok(SearchFoodsOutput {
            total: results.len(),
            foods: results,
        })
    }
}

/// Handle the `search_foods` tool.
pub(crate) async fn handle_search_foods(
    tools: &FoodTools,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: SearchFoodsArgs = parse_arguments(arguments)?;
    let output = tools.search_foods(args).await?;
    structured(&output)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mcp::handlers::testing::{SearchCall, StubFitnessApi};
    use crate::sparkyfitness::FoodVariant;
    use serde_json::json;

    fn food(id: &str, brand: Option<&str>, with_variant: bool) -> Food {
        Food {
            id: id.into(),
            name: format!("Chicken {id}"),
            brand: brand.map(str::to_string),
            is_custom: false,
            user_id: None,
            shared_with_public: true,
            provider_external_id: None,
            provider_type: Some("usda".into()),
            default_variant: with_variant.then(|| FoodVariant {
                id: format!("{id}-variant"),
                serving_size: 100.0,
                serving_unit: "g".into(),
                nutrition: NutritionFacts {
                    calories: 165.0,
                    protein: 31.0,
                    carbs: 0.0,
                    fat: 3.6,
                    sodium: Some(74.0),
                    ..NutritionFacts::default()
                },
                is_default: true,
                glycemic_index: None,
                custom_nutrients: None,
            }),
        }
    }

    fn args(name: &str) -> SearchFoodsArgs {
        SearchFoodsArgs {
            name: name.into(),
            brand: None,
            broad_match: None,
            limit: None,
        }
    }

    #[tokio::test]
    async fn drops_foods_without_default_variant() {
        let stub = Arc::new(StubFitnessApi::with_foods(vec![
            food("a", None, true),
            food("b", None, false),
            food("c", Some("Acme"), true),
            food("d", None, false),
        ]));
        let tools = FoodTools::new(stub.clone());

        let output = tools.search_foods(args("chicken")).await.expect("search");

        assert_eq!(output.foods.len(), 2);
        assert_eq!(output.total, output.foods.len());
        let ids: Vec<_> = output.foods.iter().map(|f| f.food_id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(output.foods[0].variant_id, "a-variant");
    }

    #[tokio::test]
    async fn applies_defaults_and_never_sends_brand_upstream() {
        let stub = Arc::new(StubFitnessApi::default());
        let tools = FoodTools::new(stub.clone());

        let mut request = args("chicken");
        request.brand = Some("Acme".into());
        tools.search_foods(request).await.expect("search");

        let calls = stub.searches.lock().expect("lock").clone();
        assert_eq!(
            calls,
            vec![SearchCall {
                name: "chicken".into(),
                match_mode: MatchMode::Broad,
                limit: 10,
            }]
        );
    }

    #[tokio::test]
    async fn broad_match_false_selects_exact_mode() {
        let stub = Arc::new(StubFitnessApi::default());
        let tools = FoodTools::new(stub.clone());

        let mut request = args("Rolled Oats");
        request.broad_match = Some(false);
        request.limit = Some(3);
        tools.search_foods(request).await.expect("search");

        let calls = stub.searches.lock().expect("lock").clone();
        assert_eq!(calls[0].match_mode, MatchMode::Exact);
        assert_eq!(calls[0].limit, 3);
    }

    #[tokio::test]
    async fn brand_filter_is_exact_and_case_sensitive() {
        let stub = Arc::new(StubFitnessApi::with_foods(vec![
            food("a", Some("Acme"), true),
            food("b", Some("acme"), true),
            food("c", None, true),
            food("d", Some("Acme Foods"), true),
        ]));
        let tools = FoodTools::new(stub);

        let mut request = args("chicken");
        request.brand = Some("acme".into());
        let output = tools.search_foods(request).await.expect("search");

        assert_eq!(output.total, 1);
        assert_eq!(output.foods[0].food_id, "b");
    }

    #[tokio::test]
    async fn empty_brand_disables_filtering() {
        let stub = Arc::new(StubFitnessApi::with_foods(vec![
            food("a", Some("Acme"), true),
            food("b", None, true),
        ]));
        let tools = FoodTools::new(stub);

        let mut request = args("chicken");
        request.brand = Some(String::new());
        let output = tools.search_foods(request).await.expect("search");

        assert_eq!(output.total, 2);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_calling_backend() {
        let stub = Arc::new(StubFitnessApi::default());
        let tools = FoodTools::new(stub.clone());

        let err = tools.search_foods(args("")).await.expect_err("empty name");

        assert!(matches!(err, ToolError::Validation(_)));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn structured_output_omits_absent_nutrients() {
        let stub = Arc::new(StubFitnessApi::with_foods(vec![food("a", None, true)]));
        let tools = FoodTools::new(stub);

        let mut arguments = JsonObject::new();
        arguments.insert("name".into(), json!("chicken"));
        let result = handle_search_foods(&tools, Some(arguments))
            .await
            .expect("tool result");

        let payload = result.structured_content.expect("structured");
        assert_eq!(payload["total"], 1);
        let first = &payload["foods"][0];
        assert_eq!(first["food_id"], "a");
        assert_eq!(first["calories"], 165.0);
        assert_eq!(first["sodium"], 74.0);
        assert!(first.get("iron").is_none());
        assert!(first.get("brand").is_none());
    }
}
