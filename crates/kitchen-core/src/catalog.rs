use crate::errors::{KitchenError, Result};
use crate::models::{Ingredient, RecipeLineItem};
use crate::pricing::PricedLineItem;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Id-indexed table of the latest ingredient records.
///
/// Line items carry only an ingredient id and a quantity; cost, stock and unit
/// are read from here every time a recipe is priced.
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    ingredients: HashMap<i64, Ingredient>,
}

impl IngredientCatalog {
    pub fn new(ingredients: impl IntoIterator<Item = Ingredient>) -> Self {
        Self {
            ingredients: ingredients
                .into_iter()
                .map(|ingredient| (ingredient.id, ingredient))
                .collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<&Ingredient> {
        self.ingredients.get(&id)
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    /// Insert or replace a record, e.g. after a stock update round-trip.
    pub fn upsert(&mut self, ingredient: Ingredient) {
        self.ingredients.insert(ingredient.id, ingredient);
    }

    /// Ingredients ordered by name, the order the API lists them in.
    pub fn sorted_by_name(&self) -> Vec<&Ingredient> {
        let mut all: Vec<&Ingredient> = self.ingredients.values().collect();
        all.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        all
    }

    /// Price a single line item against the current record of its ingredient.
    pub fn price(&self, item: &RecipeLineItem) -> Result<PricedLineItem> {
        let ingredient = self.get(item.ingredient_id).ok_or_else(|| {
            KitchenError::NotFound(format!(
                "Ingredient {} is not in the catalog",
                item.ingredient_id
            ))
        })?;

        if item.quantity <= Decimal::ZERO {
            return Err(KitchenError::invalid(format!(
                "Quantity for '{}' must be positive, got {}",
                ingredient.name, item.quantity
            )));
        }
        if ingredient.cost_per_unit < Decimal::ZERO {
            return Err(KitchenError::invalid(format!(
                "Cost per unit for '{}' is negative: {}",
                ingredient.name, ingredient.cost_per_unit
            )));
        }
        if ingredient.current_stock < Decimal::ZERO {
            return Err(KitchenError::invalid(format!(
                "Stock for '{}' is negative: {}",
                ingredient.name, ingredient.current_stock
            )));
        }

        Ok(PricedLineItem {
            ingredient_id: ingredient.id,
            name: ingredient.name.clone(),
            unit: ingredient.unit,
            quantity: item.quantity,
            cost_per_unit: ingredient.cost_per_unit,
            current_stock: ingredient.current_stock,
        })
    }

    /// Price every line item, preserving order. Fails on the first bad item.
    pub fn resolve(&self, items: &[RecipeLineItem]) -> Result<Vec<PricedLineItem>> {
        items.iter().map(|item| self.price(item)).collect()
    }
}

impl FromIterator<Ingredient> for IngredientCatalog {
    fn from_iter<I: IntoIterator<Item = Ingredient>>(iter: I) -> Self {
        IngredientCatalog::new(iter)
    }
}
