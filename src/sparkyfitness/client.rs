//! HTTP client wrapper for interacting with the SparkyFitness backend.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::sparkyfitness::{
    auth::{BearerAuth, RequestAuth},
    types::{
        AddFoodVariantRequest, ApiError, CreateFoodRequest, CreatedFood, CreatedVariant, Food,
        MatchMode, SearchFoodsResponse,
    },
};

/// Backend operations the MCP tools depend on.
///
/// Every method performs exactly one HTTP round trip and never retries; a failed call is
/// surfaced to the agent, which decides whether to try again.
#[async_trait]
pub trait FitnessApi: Send + Sync {
    /// Search foods by name using the given match mode.
    async fn search_foods(
        &self,
        name: &str,
        match_mode: MatchMode,
        limit: u32,
    ) -> Result<Vec<Food>, ApiError>;

    /// Create a food together with its first (default) variant.
    async fn create_food(&self, request: &CreateFoodRequest) -> Result<CreatedFood, ApiError>;

    /// Attach a new variant to an existing food.
    async fn add_food_variant(
        &self,
        request: &AddFoodVariantRequest,
    ) -> Result<CreatedVariant, ApiError>;
}

/// Lightweight authenticated HTTP client for the SparkyFitness REST API.
pub struct SparkyFitnessClient {
    client: Client,
    base_url: String,
    auth: Arc<dyn RequestAuth>,
}

impl SparkyFitnessClient {
    /// Construct a client that authenticates with the configured API key as a bearer token.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_auth(&config.api_url, Arc::new(BearerAuth::new(&config.api_key)))
    }

    /// Construct a client bound to `base_url` using an explicit authentication strategy.
    pub fn with_auth(base_url: &str, auth: Arc<dyn RequestAuth>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("sparkyfitness-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = normalize_base_url(base_url).map_err(ApiError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized SparkyFitness HTTP client");

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    /// Normalized base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.auth.apply(self.client.request(method, url))
    }

    async fn decode<T>(response: reqwest::Response, expected: StatusCode) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != expected {
            return Err(ApiError::UnexpectedStatus { status, body });
        }
        serde_json::from_str(&body).map_err(|err| ApiError::InvalidResponse {
            status,
            reason: err.to_string(),
            body,
        })
    }
}

#[async_trait]
impl FitnessApi for SparkyFitnessClient {
    async fn search_foods(
        &self,
        name: &str,
        match_mode: MatchMode,
        limit: u32,
    ) -> Result<Vec<Food>, ApiError> {
        let limit = limit.to_string();
        let response = self
            .request(Method::GET, "foods")
            .query(&[
                ("name", name),
                (match_mode.query_flag(), "true"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        match Self::decode::<SearchFoodsResponse>(response, StatusCode::OK).await {
            Ok(payload) => {
                tracing::debug!(
                    name,
                    ?match_mode,
                    results = payload.search_results.len(),
                    "Food search completed"
                );
                Ok(payload.search_results)
            }
            Err(error) => {
                tracing::error!(name, error = %error, "Food search failed");
                Err(error)
            }
        }
    }

    async fn create_food(&self, request: &CreateFoodRequest) -> Result<CreatedFood, ApiError> {
        let response = self
            .request(Method::POST, "foods")
            .json(request)
            .send()
            .await?;

        match Self::decode::<CreatedFood>(response, StatusCode::CREATED).await {
            Ok(food) => {
                tracing::debug!(
                    food_id = %food.id,
                    variant_id = %food.default_variant.id,
                    "Food created"
                );
                Ok(food)
            }
            Err(error) => {
                tracing::error!(name = %request.name, error = %error, "Food creation failed");
                Err(error)
            }
        }
    }

    async fn add_food_variant(
        &self,
        request: &AddFoodVariantRequest,
    ) -> Result<CreatedVariant, ApiError> {
        let response = self
            .request(Method::POST, "foods/food-variants")
            .json(request)
            .send()
            .await?;

        match Self::decode::<CreatedVariant>(response, StatusCode::CREATED).await {
            Ok(variant) => {
                tracing::debug!(
                    food_id = %request.food_id,
                    variant_id = %variant.id,
                    "Food variant added"
                );
                Ok(variant)
            }
            Err(error) => {
                tracing::error!(
                    food_id = %request.food_id,
                    error = %error,
                    "Adding food variant failed"
                );
                Err(error)
            }
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url.trim()).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
