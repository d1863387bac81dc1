//! Tool handlers for the MCP server.
//!
//! Each tool is a method on [`FoodTools`], which owns the shared backend client. The
//! `handle_*` functions adapt raw MCP arguments to those methods and shape the structured
//! result returned to the agent.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use thiserror::Error;

use crate::sparkyfitness::{ApiError, FitnessApi};

pub mod add_variant;
pub mod create_food;
pub mod search;

/// Failure of a single tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool arguments were missing or out of range; no backend call was made.
    #[error("{0}")]
    Validation(String),
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<ToolError> for McpError {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::Validation(message) => McpError::invalid_params(message, None),
            ToolError::Api(api) => {
                let data = api.status().map(|status| {
                    json!({
                        "status": status.as_u16(),
                        "body": api.body().unwrap_or_default(),
                    })
                });
                McpError::internal_error(api.to_string(), data)
            }
        }
    }
}

/// Food tools bound to one backend client.
#[derive(Clone)]
pub struct FoodTools {
    api: Arc<dyn FitnessApi>,
}

impl FoodTools {
    /// Bind the tools to `api`.
    pub fn new(api: Arc<dyn FitnessApi>) -> Self {
        Self { api }
    }
}

/// Ensure a required string argument is present.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.is_empty() {
        return Err(ToolError::Validation(format!("`{field}` must not be empty")));
    }
    Ok(())
}

/// Ensure the serving size describes a physical amount.
pub(crate) fn require_positive_serving(serving_size: f64) -> Result<(), ToolError> {
    if serving_size.is_nan() || serving_size <= 0.0 {
        return Err(ToolError::Validation(
            "`serving_size` must be greater than 0".into(),
        ));
    }
    Ok(())
}

/// Parse structured arguments supplied to a tool invocation.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let value = arguments
        .map(Value::Object)
        .unwrap_or_else(|| Value::Object(JsonObject::new()));
    serde_json::from_value(value)
        .map_err(|err| McpError::invalid_params(format!("Invalid arguments: {err}"), None))
}

/// Wrap a typed tool output as structured content.
pub(crate) fn structured<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let value = serde_json::to_value(output)
        .map_err(|err| McpError::internal_error(format!("Failed to encode result: {err}"), None))?;
    Ok(CallToolResult::structured(value))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording stub of the backend shared by handler tests.

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::sparkyfitness::{
        AddFoodVariantRequest, ApiError, CreateFoodRequest, CreatedFood, CreatedVariant,
        FitnessApi, Food, MatchMode, VariantRef,
    };

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct SearchCall {
        pub(crate) name: String,
        pub(crate) match_mode: MatchMode,
        pub(crate) limit: u32,
    }

    #[derive(Default)]
    pub(crate) struct StubFitnessApi {
        pub(crate) foods: Vec<Food>,
        pub(crate) searches: Mutex<Vec<SearchCall>>,
        pub(crate) created_foods: Mutex<Vec<CreateFoodRequest>>,
        pub(crate) added_variants: Mutex<Vec<AddFoodVariantRequest>>,
    }

    impl StubFitnessApi {
        pub(crate) fn with_foods(foods: Vec<Food>) -> Self {
            Self {
                foods,
                ..Self::default()
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.searches.lock().expect("lock").len()
                + self.created_foods.lock().expect("lock").len()
                + self.added_variants.lock().expect("lock").len()
        }
    }

    #[async_trait]
    impl FitnessApi for StubFitnessApi {
        async fn search_foods(
            &self,
            name: &str,
            match_mode: MatchMode,
            limit: u32,
        ) -> Result<Vec<Food>, ApiError> {
            self.searches.lock().expect("lock").push(SearchCall {
                name: name.to_string(),
                match_mode,
                limit,
            });
            Ok(self.foods.clone())
        }

        async fn create_food(&self, request: &CreateFoodRequest) -> Result<CreatedFood, ApiError> {
            self.created_foods
                .lock()
                .expect("lock")
                .push(request.clone());
            Ok(CreatedFood {
                id: "food-new".into(),
                name: request.name.clone(),
                brand: Some(request.brand.clone()),
                is_custom: request.is_custom,
                user_id: Some("user-1".into()),
                default_variant: VariantRef {
                    id: "variant-new".into(),
                },
            })
        }

        async fn add_food_variant(
            &self,
            request: &AddFoodVariantRequest,
        ) -> Result<CreatedVariant, ApiError> {
            self.added_variants
                .lock()
                .expect("lock")
                .push(request.clone());
            Ok(CreatedVariant {
                id: "variant-added".into(),
            })
        }
    }
}
