use crate::errors::{ApiError, HttpError, Result};
use kitchen_core::{
    ApiIngredientResponse, ApiRecipeResponse, CostBreakdownResponse, Decimal, Ingredient,
    IngredientInput, KitchenError, NewRecipe, RecipeInfo, ScaledRecipeResponse,
};
use log::{debug, error, info, trace};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for providing configuration to the API client
/// This allows the main application to implement config without circular dependencies
pub trait ApiConfig {
    type Error;

    /// Base URL of the kitchen API (optional, defaults to a local server)
    fn get_base_url(&self) -> std::result::Result<Option<String>, Self::Error> {
        Ok(None)
    }

    /// Per-request timeout (optional, defaults to 30 seconds)
    fn get_timeout(&self) -> std::result::Result<Option<Duration>, Self::Error> {
        Ok(None)
    }
}

/// List endpoints answer either with a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Paginated { results } => results,
            ListResponse::Plain(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: i64,
}

/// Parse and normalize a base URL. A trailing slash is required for `Url::join`
/// to keep the last path segment.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut with_slash = raw.trim().to_string();
    if !with_slash.ends_with('/') {
        with_slash.push('/');
    }

    let url = Url::parse(&with_slash)
        .map_err(|e| ApiError::Config(format!("Invalid base URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::Config(format!(
            "Unsupported URL scheme '{}' in '{}'",
            other, raw
        ))),
    }
}

/// Pull a readable message out of an error body. The server answers
/// `{"error": "..."}` for action failures and field maps for validation.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            if let Some(Value::String(message)) = map.get("error") {
                return message.clone();
            }
            if let Some(Value::String(detail)) = map.get("detail") {
                return detail.clone();
            }
            map.iter()
                .map(|(field, value)| match value {
                    Value::Array(items) => {
                        let texts: Vec<String> = items
                            .iter()
                            .map(|item| match item.as_str() {
                                Some(text) => text.to_string(),
                                None => item.to_string(),
                            })
                            .collect();
                        format!("{}: {}", field, texts.join(" "))
                    }
                    Value::String(text) => format!("{}: {}", field, text),
                    other => format!("{}: {}", field, other),
                })
                .collect::<Vec<_>>()
                .join("; ")
        }
        _ if body.trim().is_empty() => "Unknown error".to_string(),
        _ => body.trim().to_string(),
    }
}

/// HTTP client for the kitchen inventory API
#[derive(Debug, Clone)]
pub struct KitchenApiClient {
    client: Client,
    base_url: Url,
}

impl KitchenApiClient {
    /// Create a new API client
    pub fn new(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);

        debug!("Creating KitchenApiClient");
        debug!("  Base URL: {}", base_url);
        debug!("  Timeout: {:?}", timeout);

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Create API client with custom base URL
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        debug!("Creating KitchenApiClient with custom base URL: {}", base_url);
        Self::new(Some(base_url.to_string()), None)
    }

    /// Create API client from any configuration implementing ApiConfig trait
    pub fn from_config<C>(config: &C) -> std::result::Result<Self, C::Error>
    where
        C: ApiConfig,
        C::Error: From<ApiError>,
    {
        debug!("Creating KitchenApiClient from config");
        let base_url = config.get_base_url()?;
        let timeout = config.get_timeout()?;

        if let Some(ref url) = base_url {
            debug!("Got base URL from config: {}", url);
        } else {
            debug!("Using default base URL");
        }

        Ok(Self::new(base_url, timeout)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint such as `recipes/3/cost_breakdown/` against the base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ApiError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = self.endpoint_url(endpoint)?;

        debug!("HTTP {} request to: {}", method, url);
        trace!("Request headers:");
        trace!("  Content-Type: application/json");
        trace!("  X-Requested-With: XMLHttpRequest");

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("Content-Type", "application/json")
            .header("X-Requested-With", "XMLHttpRequest");

        if let Some(body) = body {
            trace!(
                "Request body: {}",
                serde_json::to_string_pretty(body).unwrap_or_else(|_| "Invalid JSON".to_string())
            );
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("{} request failed: {:?}", method, e);
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Request(e)
            }
        })?;

        debug!("Response status: {}", response.status());

        self.handle_response(response).await
    }

    /// Make a GET request
    async fn get(&self, endpoint: &str) -> Result<Response> {
        self.send(Method::GET, endpoint, None).await
    }

    /// Make a POST request
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Response> {
        self.send(Method::POST, endpoint, Some(body)).await
    }

    /// Make a PUT request
    async fn put(&self, endpoint: &str, body: &Value) -> Result<Response> {
        self.send(Method::PUT, endpoint, Some(body)).await
    }

    /// Make a PATCH request
    async fn patch(&self, endpoint: &str, body: &Value) -> Result<Response> {
        self.send(Method::PATCH, endpoint, Some(body)).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let value = response.json::<T>().await.map_err(HttpError::Request)?;
        Ok(value)
    }

    /// Handle HTTP response and convert errors
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            debug!("Request successful with status: {}", status);
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        error!("Request failed with status: {}", status);
        debug!("Error response body: {}", error_text);

        let api_error = match status {
            StatusCode::BAD_REQUEST => {
                error!("Server rejected the request (400 Bad Request)");
                HttpError::BadRequest {
                    message: error_message(&error_text),
                }
            }
            StatusCode::NOT_FOUND => {
                error!("Resource not found (404): {}", url);
                HttpError::NotFound(url)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                error!("Rate limited (429 Too Many Requests)");
                HttpError::RateLimited
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                error!("Service unavailable (503)");
                HttpError::ServiceUnavailable
            }
            StatusCode::REQUEST_TIMEOUT => {
                error!("Request timeout (408)");
                HttpError::Timeout
            }
            _ => {
                error!("HTTP error with status code: {}", status.as_u16());
                HttpError::HttpError {
                    status: status.as_u16(),
                    message: error_message(&error_text),
                }
            }
        };

        Err(ApiError::Http(api_error))
    }

    /// Get all ingredients, ordered by name server-side
    pub async fn get_ingredients(&self) -> Result<Vec<Ingredient>> {
        debug!("Fetching ingredients");
        let response = self.get("ingredients/").await?;
        let raw: ListResponse<ApiIngredientResponse> = Self::decode(response).await?;
        let ingredients: Vec<Ingredient> = raw.into_items().into_iter().map(Into::into).collect();

        info!("Successfully fetched {} ingredients", ingredients.len());

        Ok(ingredients)
    }

    pub async fn get_ingredient(&self, id: i64) -> Result<Ingredient> {
        debug!("Fetching ingredient {}", id);
        let response = self.get(&format!("ingredients/{}/", id)).await?;
        let raw: ApiIngredientResponse = Self::decode(response).await?;
        Ok(raw.into())
    }

    pub async fn create_ingredient(&self, input: &IngredientInput) -> Result<Ingredient> {
        input.validate()?;
        debug!("Creating ingredient '{}'", input.name);

        let body = serde_json::to_value(input)?;
        let response = self.post("ingredients/", &body).await?;
        let raw: ApiIngredientResponse = Self::decode(response).await?;

        info!("Created ingredient {} ({})", raw.name, raw.id);

        Ok(raw.into())
    }

    /// Replace every editable field of an ingredient
    pub async fn update_ingredient(&self, id: i64, input: &IngredientInput) -> Result<Ingredient> {
        input.validate()?;
        debug!("Updating ingredient {}", id);

        let body = serde_json::to_value(input)?;
        let response = self.put(&format!("ingredients/{}/", id), &body).await?;
        let raw: ApiIngredientResponse = Self::decode(response).await?;

        info!("Updated ingredient {}", id);

        Ok(raw.into())
    }

    /// Set the absolute stock of an ingredient
    pub async fn update_stock(&self, id: i64, current_stock: Decimal) -> Result<Ingredient> {
        if current_stock < Decimal::ZERO {
            return Err(KitchenError::invalid(format!(
                "Stock cannot be negative: {}",
                current_stock
            ))
            .into());
        }
        debug!("Updating stock of ingredient {} to {}", id, current_stock);

        let body = serde_json::json!({ "current_stock": current_stock });
        let response = self
            .patch(&format!("ingredients/{}/update_stock/", id), &body)
            .await?;
        let raw: ApiIngredientResponse = Self::decode(response).await?;

        info!("Stock of ingredient {} is now {}", id, raw.current_stock);

        Ok(raw.into())
    }

    /// Ingredients with stock strictly below `threshold`
    pub async fn get_low_stock(&self, threshold: Decimal) -> Result<Vec<Ingredient>> {
        debug!("Fetching ingredients below {}", threshold);
        let response = self
            .get(&format!("ingredients/low_stock/?threshold={}", threshold))
            .await?;
        let raw: ListResponse<ApiIngredientResponse> = Self::decode(response).await?;
        let ingredients: Vec<Ingredient> = raw.into_items().into_iter().map(Into::into).collect();

        info!("{} ingredients below {}", ingredients.len(), threshold);

        Ok(ingredients)
    }

    pub async fn get_recipes(&self) -> Result<Vec<RecipeInfo>> {
        debug!("Fetching recipes");
        let response = self.get("recipes/").await?;
        let raw: ListResponse<ApiRecipeResponse> = Self::decode(response).await?;
        let recipes: Vec<RecipeInfo> = raw.into_items().into_iter().map(Into::into).collect();

        info!("Successfully fetched {} recipes", recipes.len());

        Ok(recipes)
    }

    pub async fn get_recipe(&self, id: i64) -> Result<RecipeInfo> {
        debug!("Fetching recipe {}", id);
        let response = self.get(&format!("recipes/{}/", id)).await?;
        let raw: ApiRecipeResponse = Self::decode(response).await?;
        Ok(raw.into())
    }

    /// Create a recipe and return its new id
    pub async fn create_recipe(&self, recipe: &NewRecipe) -> Result<i64> {
        debug!(
            "Creating recipe '{}' with {} ingredients",
            recipe.name,
            recipe.ingredients.len()
        );

        let body = serde_json::to_value(recipe)?;
        let response = self.post("recipes/", &body).await?;
        let created: CreatedResponse = Self::decode(response).await?;

        info!("Created recipe {} ({})", recipe.name, created.id);

        Ok(created.id)
    }

    /// Breakdown as computed by the server
    pub async fn get_cost_breakdown(&self, id: i64) -> Result<CostBreakdownResponse> {
        debug!("Fetching cost breakdown of recipe {}", id);
        let response = self.get(&format!("recipes/{}/cost_breakdown/", id)).await?;
        Self::decode(response).await
    }

    /// Scaling as computed by the server
    pub async fn scale_recipe(
        &self,
        id: i64,
        scale_factor: Decimal,
    ) -> Result<ScaledRecipeResponse> {
        if scale_factor <= Decimal::ZERO {
            return Err(KitchenError::invalid(format!(
                "Scale factor must be positive, got {}",
                scale_factor
            ))
            .into());
        }
        debug!("Scaling recipe {} by {}", id, scale_factor);

        let body = serde_json::json!({ "scale_factor": scale_factor });
        let response = self
            .post(&format!("recipes/{}/scale_recipe/", id), &body)
            .await?;
        Self::decode(response).await
    }

    /// Recipes the current stock allows at least one portion of
    pub async fn get_producible_recipes(&self) -> Result<Vec<RecipeInfo>> {
        debug!("Fetching producible recipes");
        let response = self.get("recipes/producible/").await?;
        let raw: ListResponse<ApiRecipeResponse> = Self::decode(response).await?;
        let recipes: Vec<RecipeInfo> = raw.into_items().into_iter().map(Into::into).collect();

        info!("{} recipes can be produced", recipes.len());

        Ok(recipes)
    }

    /// Test connection to the API
    pub async fn test_connection(&self) -> Result<bool> {
        debug!("Testing API connection");
        match self.get("ingredients/").await {
            Ok(_) => {
                info!("API connection successful");
                Ok(true)
            }
            Err(e) => {
                error!("API connection failed: {:?}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_urls_keep_base_path() {
        let client = KitchenApiClient::with_base_url("http://localhost:8000/api").unwrap();

        assert_eq!(
            client.endpoint_url("recipes/3/cost_breakdown/").unwrap().as_str(),
            "http://localhost:8000/api/recipes/3/cost_breakdown/"
        );
        assert_eq!(
            client.endpoint_url("/ingredients/").unwrap().as_str(),
            "http://localhost:8000/api/ingredients/"
        );
        assert_eq!(
            client
                .endpoint_url("ingredients/low_stock/?threshold=20")
                .unwrap()
                .as_str(),
            "http://localhost:8000/api/ingredients/low_stock/?threshold=20"
        );
    }

    #[test]
    fn test_rejects_invalid_base_urls() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            normalize_base_url("ftp://example.com/api/"),
            Err(ApiError::Config(_))
        ));
        assert_eq!(
            normalize_base_url(DEFAULT_BASE_URL).unwrap().as_str(),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_list_response_accepts_both_shapes() {
        let plain: ListResponse<i64> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(plain.into_items(), vec![1, 2, 3]);

        let paginated: ListResponse<i64> = serde_json::from_value(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [4, 5]
        }))
        .unwrap();
        assert_eq!(paginated.into_items(), vec![4, 5]);
    }

    #[test]
    fn test_ingredient_list_decodes_from_envelope() {
        let body = json!({
            "results": [{
                "id": 1,
                "name": "Harina",
                "unit": "kg",
                "unit_display": "Kilogramos",
                "cost_per_unit": "1.20",
                "current_stock": "25.000",
                "created_at": "2024-01-01T10:00:00Z",
                "updated_at": "2024-01-02T10:00:00Z"
            }]
        });

        let raw: ListResponse<ApiIngredientResponse> = serde_json::from_value(body).unwrap();
        let ingredients: Vec<Ingredient> = raw.into_items().into_iter().map(Into::into).collect();

        assert_eq!(ingredients.len(), 1);
        assert_eq!(ingredients[0].name, "Harina");
        assert_eq!(ingredients[0].current_stock, Decimal::new(25, 0));
        assert!(ingredients[0].created_at.is_some());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "scale_factor is required"}"#),
            "scale_factor is required"
        );
        assert_eq!(
            error_message(r#"{"name": ["This field is required."]}"#),
            "name: This field is required."
        );
        assert_eq!(error_message(r#"{"detail": "Not found."}"#), "Not found.");
        assert_eq!(error_message("<html>oops</html>"), "<html>oops</html>");
        assert_eq!(error_message(""), "Unknown error");
    }

    #[tokio::test]
    async fn test_connection_reports_unreachable_server() {
        let client = KitchenApiClient::new(
            Some("http://127.0.0.1:9/api/".to_string()),
            Some(Duration::from_secs(2)),
        )
        .unwrap();

        assert!(!client.test_connection().await.unwrap());
    }

    #[tokio::test]
    async fn test_update_stock_rejects_negative_before_sending() {
        let client = KitchenApiClient::with_base_url("http://127.0.0.1:9/api/").unwrap();
        let err = client
            .update_stock(1, Decimal::new(-1, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Core(_)));
    }
}
