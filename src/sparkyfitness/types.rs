//! Wire types exchanged with the SparkyFitness backend.

use reqwest::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned while interacting with the SparkyFitness API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid SparkyFitness API URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Backend responded with a status other than the one the endpoint promises.
    #[error("Unexpected SparkyFitness response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Backend responded successfully but the body did not match the expected shape.
    #[error("Unparseable SparkyFitness response ({status}): {reason}; body: {body}")]
    InvalidResponse {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Raw body for diagnostics.
        body: String,
        /// Decoder explanation.
        reason: String,
    },
}

impl ApiError {
    /// HTTP status associated with the failure, when a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedStatus { status, .. } | Self::InvalidResponse { status, .. } => {
                Some(*status)
            }
            Self::Http(err) => err.status(),
            Self::InvalidUrl(_) => None,
        }
    }

    /// Raw response body associated with the failure, when one was read.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::UnexpectedStatus { body, .. } | Self::InvalidResponse { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }
}

/// Search mode understood by `GET /foods`; the backend treats the two flags as exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    /// Partial, case-insensitive name matching (`broadMatch=true`).
    Broad,
    /// Exact name matching (`exactMatch=true`).
    Exact,
}

impl MatchMode {
    /// Query parameter name that enables this mode.
    pub fn query_flag(self) -> &'static str {
        match self {
            Self::Broad => "broadMatch",
            Self::Exact => "exactMatch",
        }
    }
}

impl From<bool> for MatchMode {
    fn from(broad: bool) -> Self {
        if broad { Self::Broad } else { Self::Exact }
    }
}

/// Macro and micro nutrients for one serving.
///
/// The four macros are always present. Every other nutrient is optional and skipped on
/// serialization when absent, so an explicit `0` is never confused with "not provided".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NutritionFacts {
    /// Calories per serving.
    pub calories: f64,
    /// Protein in grams.
    pub protein: f64,
    /// Carbohydrates in grams.
    pub carbs: f64,
    /// Fat in grams.
    pub fat: f64,
    /// Saturated fat in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    /// Polyunsaturated fat in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyunsaturated_fat: Option<f64>,
    /// Monounsaturated fat in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monounsaturated_fat: Option<f64>,
    /// Trans fat in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans_fat: Option<f64>,
    /// Cholesterol in milligrams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
    /// Sodium in milligrams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    /// Potassium in milligrams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    /// Dietary fiber in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_fiber: Option<f64>,
    /// Sugars in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugars: Option<f64>,
    /// Vitamin A.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_a: Option<f64>,
    /// Vitamin C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<f64>,
    /// Calcium.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    /// Iron.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
}

/// Food entity as returned by `GET /foods`.
#[derive(Clone, Debug, Deserialize)]
pub struct Food {
    /// Opaque food identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional brand name.
    #[serde(default)]
    pub brand: Option<String>,
    /// Whether the food was created by a user rather than imported from a provider.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_custom: bool,
    /// Owner of the food entry.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Whether the food is visible to every user.
    #[serde(default, deserialize_with = "null_as_default")]
    pub shared_with_public: bool,
    /// Identifier of the food at the external provider.
    #[serde(default)]
    pub provider_external_id: Option<String>,
    /// External provider the food was imported from (e.g. `usda`).
    #[serde(default)]
    pub provider_type: Option<String>,
    /// Variant used when none is requested explicitly.
    #[serde(default)]
    pub default_variant: Option<FoodVariant>,
}

/// Serving-size/nutrition profile belonging to a food.
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "WireFoodVariant")]
pub struct FoodVariant {
    /// Opaque variant identifier.
    pub id: String,
    /// Serving size amount.
    pub serving_size: f64,
    /// Unit of the serving size.
    pub serving_unit: String,
    /// Nutrients per serving.
    pub nutrition: NutritionFacts,
    /// Whether this variant is the food's default.
    pub is_default: bool,
    /// Glycemic index label, when known.
    pub glycemic_index: Option<String>,
    /// Free-form extra nutrients.
    pub custom_nutrients: Option<Map<String, Value>>,
}

// Variant as the backend sends it: numerics may be strings and any column may be null.
#[derive(Deserialize)]
struct WireFoodVariant {
    id: String,
    #[serde(deserialize_with = "number")]
    serving_size: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    serving_unit: String,
    #[serde(flatten)]
    nutrition: WireNutrition,
    #[serde(default, deserialize_with = "null_as_default")]
    is_default: bool,
    #[serde(default)]
    glycemic_index: Option<String>,
    #[serde(default)]
    custom_nutrients: Option<Map<String, Value>>,
}

impl From<WireFoodVariant> for FoodVariant {
    fn from(wire: WireFoodVariant) -> Self {
        Self {
            id: wire.id,
            serving_size: wire.serving_size,
            serving_unit: wire.serving_unit,
            nutrition: wire.nutrition.into(),
            is_default: wire.is_default,
            glycemic_index: wire.glycemic_index,
            custom_nutrients: wire.custom_nutrients,
        }
    }
}

#[derive(Deserialize)]
struct WireNutrition {
    #[serde(deserialize_with = "number")]
    calories: f64,
    #[serde(deserialize_with = "number")]
    protein: f64,
    #[serde(deserialize_with = "number")]
    carbs: f64,
    #[serde(deserialize_with = "number")]
    fat: f64,
    #[serde(default, deserialize_with = "optional_number")]
    saturated_fat: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    polyunsaturated_fat: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    monounsaturated_fat: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    trans_fat: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    cholesterol: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    sodium: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    potassium: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    dietary_fiber: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    sugars: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    vitamin_a: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    vitamin_c: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    calcium: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    iron: Option<f64>,
}

impl From<WireNutrition> for NutritionFacts {
    fn from(wire: WireNutrition) -> Self {
        Self {
            calories: wire.calories,
            protein: wire.protein,
            carbs: wire.carbs,
            fat: wire.fat,
            saturated_fat: wire.saturated_fat,
            polyunsaturated_fat: wire.polyunsaturated_fat,
            monounsaturated_fat: wire.monounsaturated_fat,
            trans_fat: wire.trans_fat,
            cholesterol: wire.cholesterol,
            sodium: wire.sodium,
            potassium: wire.potassium,
            dietary_fiber: wire.dietary_fiber,
            sugars: wire.sugars,
            vitamin_a: wire.vitamin_a,
            vitamin_c: wire.vitamin_c,
            calcium: wire.calcium,
            iron: wire.iron,
        }
    }
}

/// Response body of `GET /foods`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchFoodsResponse {
    #[serde(default)]
    pub(crate) search_results: Vec<Food>,
}

/// Body of `POST /foods`: a food together with its first variant.
#[derive(Clone, Debug, Serialize)]
pub struct CreateFoodRequest {
    /// Food name.
    pub name: String,
    /// Brand name; empty when unknown.
    pub brand: String,
    /// Foods created through this server are always custom.
    pub is_custom: bool,
    /// Whether the food shows up in the quick-add list.
    pub is_quick_food: bool,
    /// Serving size amount.
    pub serving_size: f64,
    /// Unit of the serving size.
    pub serving_unit: String,
    /// Nutrients per serving.
    #[serde(flatten)]
    pub nutrition: NutritionFacts,
    /// Whether the variant becomes the food's default.
    pub is_default: bool,
    /// Glycemic index label.
    pub glycemic_index: String,
    /// Free-form extra nutrients.
    pub custom_nutrients: Map<String, Value>,
}

/// Identifier-only view of a variant nested in other responses.
#[derive(Clone, Debug, Deserialize)]
pub struct VariantRef {
    /// Variant identifier.
    pub id: String,
}

/// Response body of `POST /foods`.
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedFood {
    /// Identifier of the new food.
    pub id: String,
    /// Stored food name.
    pub name: String,
    /// Stored brand name.
    #[serde(default)]
    pub brand: Option<String>,
    /// Whether the food is custom.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_custom: bool,
    /// Owner of the food entry.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Variant created alongside the food.
    pub default_variant: VariantRef,
}

/// Body of `POST /foods/food-variants`.
#[derive(Clone, Debug, Serialize)]
pub struct AddFoodVariantRequest {
    /// Food receiving the variant.
    pub food_id: String,
    /// Serving size amount.
    pub serving_size: f64,
    /// Unit of the serving size.
    pub serving_unit: String,
    /// Nutrients per serving.
    #[serde(flatten)]
    pub nutrition: NutritionFacts,
    /// Whether the variant becomes the food's default.
    pub is_default: bool,
    /// Glycemic index label, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glycemic_index: Option<String>,
    /// Free-form extra nutrients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_nutrients: Option<Map<String, Value>>,
}

/// Response body of `POST /foods/food-variants`.
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedVariant {
    /// Identifier of the new variant.
    pub id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a number, found '{text}'"))),
        }
    }
}

// The backend serialises SQL `numeric` columns as strings.
fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_number(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_f64)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variant_accepts_numeric_strings_and_nulls() {
        let variant: FoodVariant = serde_json::from_value(json!({
            "id": "v-1",
            "serving_size": "100.00",
            "serving_unit": "g",
            "calories": "165",
            "protein": 31.0,
            "carbs": null,
            "fat": "3.6",
            "sodium": "74.5",
            "iron": null,
            "is_default": true
        }))
        .expect("variant");

        assert_eq!(variant.serving_size, 100.0);
        assert_eq!(variant.nutrition.calories, 165.0);
        assert_eq!(variant.nutrition.carbs, 0.0);
        assert_eq!(variant.nutrition.sodium, Some(74.5));
        assert_eq!(variant.nutrition.iron, None);
        assert_eq!(variant.nutrition.sugars, None);
    }

    #[test]
    fn non_numeric_strings_are_rejected() {
        let result = serde_json::from_value::<FoodVariant>(json!({
            "id": "v-1",
            "serving_size": 100,
            "serving_unit": "g",
            "calories": "lots",
            "protein": 1,
            "carbs": 1,
            "fat": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn caller_supplied_nutrition_is_strict() {
        let base = json!({ "calories": 52, "protein": 3.9, "carbs": 10.5, "fat": 0.4 });
        assert!(serde_json::from_value::<NutritionFacts>(base.clone()).is_ok());

        for (field, value) in [
            ("calories", json!(null)),
            ("protein", json!("12")),
            ("sodium", json!("74.5")),
        ] {
            let mut raw = base.clone();
            raw[field] = value;
            let result = serde_json::from_value::<NutritionFacts>(raw);
            assert!(result.is_err(), "{field} must be a JSON number");
        }

        let mut raw = base;
        raw["iron"] = json!(null);
        let facts: NutritionFacts = serde_json::from_value(raw).expect("null optional");
        assert_eq!(facts.iron, None);
    }

    #[test]
    fn search_row_tolerates_null_flags_and_unit() {
        let food: Food = serde_json::from_value(json!({
            "id": "food-1",
            "name": "Rice",
            "is_custom": null,
            "shared_with_public": null,
            "default_variant": {
                "id": "v-1",
                "serving_size": "100",
                "serving_unit": null,
                "calories": "130",
                "protein": "2.7",
                "carbs": "28",
                "fat": "0.3",
                "is_default": null
            }
        }))
        .expect("food");

        assert!(!food.is_custom);
        assert!(!food.shared_with_public);
        let variant = food.default_variant.expect("variant");
        assert_eq!(variant.serving_unit, "");
        assert!(!variant.is_default);
        assert_eq!(variant.nutrition.calories, 130.0);

        let created: CreatedFood = serde_json::from_value(json!({
            "id": "food-2",
            "name": "Oats",
            "is_custom": null,
            "default_variant": { "id": "v-2" }
        }))
        .expect("created food");
        assert!(!created.is_custom);
    }

    #[test]
    fn absent_nutrients_are_omitted_but_zero_is_kept() {
        let facts = NutritionFacts {
            calories: 10.0,
            protein: 1.0,
            carbs: 2.0,
            fat: 0.5,
            sugars: Some(0.0),
            ..NutritionFacts::default()
        };
        let value = serde_json::to_value(&facts).expect("serialize");
        let object = value.as_object().expect("object");
        assert_eq!(object["sugars"], json!(0.0));
        assert!(!object.contains_key("sodium"));
        assert!(!object.contains_key("iron"));
        assert_eq!(object.len(), 5);
    }

    #[test]
    fn match_mode_maps_to_exclusive_flags() {
        assert_eq!(MatchMode::from(true), MatchMode::Broad);
        assert_eq!(MatchMode::from(false), MatchMode::Exact);
        assert_eq!(MatchMode::Broad.query_flag(), "broadMatch");
        assert_eq!(MatchMode::Exact.query_flag(), "exactMatch");
    }
}
