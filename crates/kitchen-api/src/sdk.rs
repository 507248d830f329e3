use crate::client::KitchenApiClient;
use crate::errors::{ApiError, Result};
use futures::try_join;
use kitchen_core::{
    CostBreakdown, CostCalculator, Decimal, DraftSummary, Ingredient, IngredientCatalog,
    IngredientQuery, KitchenError, RecipeDraft, RecipeInfo, RecipeQuery, ScaledRecipe,
};
use log::debug;

/// A recipe as stored on the server, priced against the current ingredient table.
#[derive(Debug, Clone)]
pub struct RecipeCosting {
    pub recipe: RecipeInfo,
    pub breakdown: CostBreakdown,
}

/// A stored recipe projected to a different batch size.
#[derive(Debug, Clone)]
pub struct RecipeScaling {
    pub recipe: RecipeInfo,
    pub scaled: ScaledRecipe,
}

/// Main SDK struct for the kitchen API
pub struct Kitchen {
    api_client: KitchenApiClient,
    calculator: CostCalculator,
}

impl Kitchen {
    /// Create with the default calculator thresholds
    pub fn new(api_client: KitchenApiClient) -> Self {
        Self::with_calculator(api_client, CostCalculator::default())
    }

    pub fn with_calculator(api_client: KitchenApiClient, calculator: CostCalculator) -> Self {
        Self {
            api_client,
            calculator,
        }
    }

    /// Create from the `KITCHEN_API_URL` environment variable, falling back to
    /// the local default
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("KITCHEN_API_URL").ok();
        let client = KitchenApiClient::new(base_url, None)?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &KitchenApiClient {
        &self.api_client
    }

    pub fn calculator(&self) -> &CostCalculator {
        &self.calculator
    }

    /// List ingredients, narrowed and ordered by `query`
    pub async fn list_ingredients(&self, query: &IngredientQuery) -> Result<Vec<Ingredient>> {
        let ingredients = self.api_client.get_ingredients().await?;
        Ok(query.apply(&ingredients))
    }

    /// Fresh catalog built from the current ingredient records
    pub async fn catalog(&self) -> Result<IngredientCatalog> {
        let ingredients = self.api_client.get_ingredients().await?;
        Ok(IngredientCatalog::new(ingredients))
    }

    /// List recipes, narrowed and ordered by `query`
    pub async fn list_recipes(&self, query: &RecipeQuery) -> Result<Vec<RecipeInfo>> {
        let recipes = if query.producible_only {
            self.api_client.get_producible_recipes().await?
        } else {
            self.api_client.get_recipes().await?
        };
        Ok(query.apply(&recipes))
    }

    /// Fetch a recipe and the ingredient table together and compute the
    /// breakdown locally
    pub async fn recipe_costing(&self, recipe_id: i64) -> Result<RecipeCosting> {
        debug!("Costing recipe {}", recipe_id);
        let (recipe, ingredients) = try_join!(
            self.api_client.get_recipe(recipe_id),
            self.api_client.get_ingredients()
        )?;

        let catalog = IngredientCatalog::new(ingredients);
        let breakdown = self.calculator.breakdown(&catalog, &recipe.recipe)?;

        Ok(RecipeCosting { recipe, breakdown })
    }

    /// Scale a stored recipe without asking the server to do it
    pub async fn scale_recipe_locally(
        &self,
        recipe_id: i64,
        factor: Decimal,
    ) -> Result<RecipeScaling> {
        debug!("Scaling recipe {} by {} locally", recipe_id, factor);
        let (recipe, ingredients) = try_join!(
            self.api_client.get_recipe(recipe_id),
            self.api_client.get_ingredients()
        )?;

        let catalog = IngredientCatalog::new(ingredients);
        let scaled = self.calculator.scale(&catalog, &recipe.recipe, factor)?;

        Ok(RecipeScaling { recipe, scaled })
    }

    /// Live totals for a recipe that is still being built
    pub async fn draft_summary(&self, draft: &RecipeDraft) -> Result<DraftSummary> {
        let catalog = self.catalog().await?;
        Ok(draft.summary(&catalog)?)
    }

    /// Validate a draft against the catalog, create it, and return the stored recipe
    pub async fn create_recipe(&self, draft: &RecipeDraft) -> Result<RecipeInfo> {
        let request = draft.to_request()?;

        let catalog = self.catalog().await?;
        catalog.resolve(draft.lines())?;

        let id = self.api_client.create_recipe(&request).await?;
        self.api_client.get_recipe(id).await
    }

    pub async fn update_stock(
        &self,
        ingredient_id: i64,
        current_stock: Decimal,
    ) -> Result<Ingredient> {
        self.api_client.update_stock(ingredient_id, current_stock).await
    }

    /// Ingredients strictly below `threshold`
    pub async fn low_stock(&self, threshold: Decimal) -> Result<Vec<Ingredient>> {
        self.api_client.get_low_stock(threshold).await
    }

    /// Get ingredient by id or by exact (case-insensitive) name
    pub async fn find_ingredient(&self, id_or_name: &str) -> Result<Ingredient> {
        if let Ok(id) = id_or_name.trim().parse::<i64>() {
            return self.api_client.get_ingredient(id).await;
        }

        let needle = id_or_name.trim().to_lowercase();
        self.api_client
            .get_ingredients()
            .await?
            .into_iter()
            .find(|ingredient| ingredient.name.to_lowercase() == needle)
            .ok_or_else(|| {
                ApiError::Core(KitchenError::NotFound(format!(
                    "No ingredient named '{}'",
                    id_or_name
                )))
            })
    }

    /// Test API connection
    pub async fn test_connection(&self) -> Result<bool> {
        self.api_client.test_connection().await
    }
}
