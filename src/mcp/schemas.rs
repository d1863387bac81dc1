//! JSON schema builders for MCP tools.
//!
//! Schemas are derived from the argument and result types so tool discovery never drifts
//! from what the handlers actually accept.

use schemars::{JsonSchema, r#gen::SchemaSettings};
use serde_json::{Map, Value, json};

use super::handlers::{
    add_variant::{AddFoodVariantArgs, AddFoodVariantOutput},
    create_food::{CreateFoodArgs, CreateFoodOutput},
    search::{SearchFoodsArgs, SearchFoodsOutput},
};

/// Build the schema describing the `search_foods` tool input.
pub(crate) fn search_foods_input_schema() -> Map<String, Value> {
    let mut schema = object_schema_for::<SearchFoodsArgs>();
    schema.insert(
        "examples".into(),
        Value::Array(vec![
            json!({ "name": "chicken breast" }),
            json!({ "name": "Greek Yogurt", "brand": "Fage", "broad_match": false, "limit": 5 }),
        ]),
    );
    schema
}

/// Build the schema describing the `search_foods` tool output.
pub(crate) fn search_foods_output_schema() -> Map<String, Value> {
    object_schema_for::<SearchFoodsOutput>()
}

/// Build the schema describing the `add_food_variant` tool input.
pub(crate) fn add_food_variant_input_schema() -> Map<String, Value> {
    object_schema_for::<AddFoodVariantArgs>()
}

/// Build the schema describing the `add_food_variant` tool output.
pub(crate) fn add_food_variant_output_schema() -> Map<String, Value> {
    object_schema_for::<AddFoodVariantOutput>()
}

/// Build the schema describing the `create_food_variant` tool input.
pub(crate) fn create_food_variant_input_schema() -> Map<String, Value> {
    object_schema_for::<CreateFoodArgs>()
}

/// Build the schema describing the `create_food_variant` tool output.
pub(crate) fn create_food_variant_output_schema() -> Map<String, Value> {
    object_schema_for::<CreateFoodOutput>()
}

fn object_schema_for<T: JsonSchema>() -> Map<String, Value> {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();
    let root = generator.into_root_schema_for::<T>();

    let mut schema = match serde_json::to_value(root) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    schema.remove("title");
    schema.remove("definitions");
    schema
        .entry("type")
        .or_insert_with(|| Value::String("object".into()));
    schema
}
