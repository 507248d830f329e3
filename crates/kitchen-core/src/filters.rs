use crate::errors::{KitchenError, Result};
use crate::models::{Ingredient, RecipeInfo, Unit};
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientSort {
    /// Alphabetical.
    Name,
    /// Highest stock first.
    Stock,
    /// Cheapest first.
    Cost,
}

impl FromStr for IngredientSort {
    type Err = KitchenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(IngredientSort::Name),
            "stock" => Ok(IngredientSort::Stock),
            "cost" => Ok(IngredientSort::Cost),
            other => Err(KitchenError::invalid(format!(
                "Unknown sort '{}'. Use name, stock or cost",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeSort {
    Name,
    /// Cheapest per portion first.
    Cost,
    /// Fewest portions first.
    Portions,
}

impl FromStr for RecipeSort {
    type Err = KitchenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(RecipeSort::Name),
            "cost" => Ok(RecipeSort::Cost),
            "portions" => Ok(RecipeSort::Portions),
            other => Err(KitchenError::invalid(format!(
                "Unknown sort '{}'. Use name, cost or portions",
                other
            ))),
        }
    }
}

/// Cost-per-portion band: low is under 2, medium is 2 to 5 inclusive, high is over 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBand {
    Low,
    Medium,
    High,
}

impl CostBand {
    pub fn contains(&self, cost_per_portion: Decimal) -> bool {
        let two = Decimal::new(2, 0);
        let five = Decimal::new(5, 0);
        match self {
            CostBand::Low => cost_per_portion < two,
            CostBand::Medium => cost_per_portion >= two && cost_per_portion <= five,
            CostBand::High => cost_per_portion > five,
        }
    }
}

impl FromStr for CostBand {
    type Err = KitchenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(CostBand::Low),
            "medium" => Ok(CostBand::Medium),
            "high" => Ok(CostBand::High),
            other => Err(KitchenError::invalid(format!(
                "Unknown cost band '{}'. Use low, medium or high",
                other
            ))),
        }
    }
}

/// Criteria for narrowing the ingredient list.
#[derive(Debug, Clone, Default)]
pub struct IngredientQuery {
    pub search: Option<String>,
    pub unit: Option<Unit>,
    pub sort: Option<IngredientSort>,
}

impl IngredientQuery {
    pub fn apply(&self, ingredients: &[Ingredient]) -> Vec<Ingredient> {
        let mut result = match &self.search {
            Some(term) => search_ingredients(ingredients, term),
            None => ingredients.to_vec(),
        };
        if let Some(unit) = self.unit {
            result = filter_by_unit(&result, unit);
        }
        if let Some(sort) = self.sort {
            sort_ingredients(&mut result, sort);
        }
        result
    }
}

/// Criteria for narrowing the recipe list.
#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub search: Option<String>,
    pub cost_band: Option<CostBand>,
    pub sort: Option<RecipeSort>,
    pub producible_only: bool,
}

impl RecipeQuery {
    pub fn apply(&self, recipes: &[RecipeInfo]) -> Vec<RecipeInfo> {
        let mut result = match &self.search {
            Some(term) => search_recipes(recipes, term),
            None => recipes.to_vec(),
        };
        if let Some(band) = self.cost_band {
            result.retain(|r| band.contains(r.cost_per_portion));
        }
        if self.producible_only {
            result.retain(|r| r.producible_portions > 0);
        }
        if let Some(sort) = self.sort {
            sort_recipes(&mut result, sort);
        }
        result
    }
}

/// Case-insensitive substring match on the name. A blank term matches everything.
pub fn search_ingredients(ingredients: &[Ingredient], term: &str) -> Vec<Ingredient> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return ingredients.to_vec();
    }
    ingredients
        .iter()
        .filter(|i| i.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn filter_by_unit(ingredients: &[Ingredient], unit: Unit) -> Vec<Ingredient> {
    ingredients
        .iter()
        .filter(|i| i.unit == unit)
        .cloned()
        .collect()
}

pub fn sort_ingredients(ingredients: &mut [Ingredient], sort: IngredientSort) {
    match sort {
        IngredientSort::Name => {
            ingredients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
        IngredientSort::Stock => ingredients.sort_by(|a, b| b.current_stock.cmp(&a.current_stock)),
        IngredientSort::Cost => ingredients.sort_by(|a, b| a.cost_per_unit.cmp(&b.cost_per_unit)),
    }
}

/// Match on name or description.
pub fn search_recipes(recipes: &[RecipeInfo], term: &str) -> Vec<RecipeInfo> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return recipes.to_vec();
    }
    recipes
        .iter()
        .filter(|r| {
            r.recipe.name.to_lowercase().contains(&needle)
                || r.recipe.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub fn sort_recipes(recipes: &mut [RecipeInfo], sort: RecipeSort) {
    match sort {
        RecipeSort::Name => recipes.sort_by(|a, b| {
            a.recipe
                .name
                .to_lowercase()
                .cmp(&b.recipe.name.to_lowercase())
        }),
        RecipeSort::Cost => recipes.sort_by(|a, b| a.cost_per_portion.cmp(&b.cost_per_portion)),
        RecipeSort::Portions => {
            recipes.sort_by(|a, b| a.recipe.yield_portions.cmp(&b.recipe.yield_portions))
        }
    }
}
