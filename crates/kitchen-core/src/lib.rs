//! # Kitchen Core
//!
//! Core domain logic for kitchen inventory and recipe costing.
//!
//! This crate contains pure business logic with no I/O dependencies:
//! - Domain models and API payload types
//! - Error definitions
//! - Cost aggregation, sufficiency and scaling
//! - Stock tiers and producible portions
//! - Validated parsing of user input
//!
//! Line items carry only an ingredient id and a quantity. Costs and stock are
//! looked up in an [`IngredientCatalog`] each time a recipe is priced, so a
//! breakdown always reflects the latest ingredient records.

pub mod catalog;
pub mod draft;
pub mod errors;
pub mod filters;
pub mod models;
pub mod parsing;
pub mod pricing;
pub mod stock;

// Re-export commonly used types
pub use catalog::IngredientCatalog;
pub use draft::{DraftStockStatus, DraftSummary, RecipeDraft};
pub use errors::{KitchenError, Result};
pub use filters::{CostBand, IngredientQuery, IngredientSort, RecipeQuery, RecipeSort};
pub use models::{
    ApiIngredientResponse, ApiRecipeIngredientResponse, ApiRecipeResponse, CostBreakdownEntry,
    CostBreakdownResponse, Ingredient, IngredientInput, NewRecipe, NewRecipeLine, Recipe,
    RecipeIngredientInfo, RecipeInfo, RecipeLineItem, ScaledIngredientEntry,
    ScaledRecipeResponse, Unit, UnitKind,
};
pub use pricing::{
    all_sufficient, cost_per_portion, is_sufficient, line_item_cost, percentage_of_total, scale,
    total_cost, BreakdownLine, CostBreakdown, CostCalculator, PricedLineItem, ScaledLine,
    ScaledRecipe,
};
pub use stock::{
    low_stock, producible_portions, stock_level, stock_tier, StockLevel, StockThresholds,
    StockTier,
};

// Decimal is part of every public signature here.
pub use rust_decimal::Decimal;
