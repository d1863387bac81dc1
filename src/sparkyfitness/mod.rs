//! SparkyFitness backend integration.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{BearerAuth, RequestAuth};
pub use client::{FitnessApi, SparkyFitnessClient};
pub use types::{
    AddFoodVariantRequest, ApiError, CreateFoodRequest, CreatedFood, CreatedVariant, Food,
    FoodVariant, MatchMode, NutritionFacts, VariantRef,
};
