use crate::catalog::IngredientCatalog;
use crate::errors::{KitchenError, Result};
use crate::models::{NewRecipe, NewRecipeLine, RecipeLineItem};
use crate::pricing::{all_sufficient, cost_per_portion, total_cost};
use rust_decimal::Decimal;

/// Whether the current stock covers the whole draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStockStatus {
    Empty,
    Sufficient,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftSummary {
    pub total_cost: Decimal,
    pub cost_per_portion: Decimal,
    pub stock_status: DraftStockStatus,
}

/// A recipe being assembled before it is submitted.
///
/// Holds only ingredient ids and quantities; pricing happens in [`RecipeDraft::summary`]
/// against whatever catalog the caller passes in.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub name: String,
    pub description: String,
    pub yield_portions: u32,
    pub preparation_time: Option<u32>,
    lines: Vec<RecipeLineItem>,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            yield_portions: 1,
            preparation_time: None,
            lines: Vec::new(),
        }
    }
}

impl RecipeDraft {
    pub fn new(name: impl Into<String>, yield_portions: u32) -> Self {
        Self {
            name: name.into(),
            yield_portions,
            ..Default::default()
        }
    }

    pub fn lines(&self) -> &[RecipeLineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add an ingredient, or replace its quantity if it is already in the draft.
    /// Position in the list is kept on replacement.
    pub fn add_line(&mut self, ingredient_id: i64, quantity: Decimal) -> Result<()> {
        if quantity <= Decimal::ZERO {
            return Err(KitchenError::invalid(format!(
                "Quantity must be greater than zero, got {}",
                quantity
            )));
        }

        match self
            .lines
            .iter_mut()
            .find(|line| line.ingredient_id == ingredient_id)
        {
            Some(existing) => existing.quantity = quantity,
            None => self.lines.push(RecipeLineItem::new(ingredient_id, quantity)),
        }
        Ok(())
    }

    /// Remove the line at `index` (0-based) and return it.
    pub fn remove_line(&mut self, index: usize) -> Result<RecipeLineItem> {
        if index >= self.lines.len() {
            return Err(KitchenError::invalid(format!(
                "No ingredient at position {} (draft has {})",
                index + 1,
                self.lines.len()
            )));
        }
        Ok(self.lines.remove(index))
    }

    pub fn set_yield(&mut self, yield_portions: u32) -> Result<()> {
        if yield_portions == 0 {
            return Err(KitchenError::invalid("Yield must be at least one portion"));
        }
        self.yield_portions = yield_portions;
        Ok(())
    }

    pub fn summary(&self, catalog: &IngredientCatalog) -> Result<DraftSummary> {
        let items = catalog.resolve(&self.lines)?;

        let stock_status = if items.is_empty() {
            DraftStockStatus::Empty
        } else if all_sufficient(&items) {
            DraftStockStatus::Sufficient
        } else {
            DraftStockStatus::Insufficient
        };

        Ok(DraftSummary {
            total_cost: total_cost(&items)?,
            cost_per_portion: cost_per_portion(&items, i64::from(self.yield_portions))?,
            stock_status,
        })
    }

    /// Validate and turn the draft into the creation request body.
    pub fn to_request(&self) -> Result<NewRecipe> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(KitchenError::invalid("Recipe name is required"));
        }
        if self.yield_portions == 0 {
            return Err(KitchenError::invalid("Yield must be at least one portion"));
        }
        if self.lines.is_empty() {
            return Err(KitchenError::invalid(
                "Add at least one ingredient before saving the recipe",
            ));
        }

        Ok(NewRecipe {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            yield_portions: self.yield_portions,
            preparation_time: self.preparation_time,
            ingredients: self.lines.iter().map(NewRecipeLine::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, Unit};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn catalog() -> IngredientCatalog {
        let make = |id: i64, cost: &str, stock: &str| Ingredient {
            id,
            name: format!("ingredient-{}", id),
            unit: Unit::Grams,
            unit_display: None,
            cost_per_unit: d(cost),
            current_stock: d(stock),
            created_at: None,
            updated_at: None,
        };
        IngredientCatalog::new(vec![make(1, "1.50", "10"), make(2, "3.00", "0")])
    }

    #[test]
    fn test_add_line_upserts_in_place() {
        let mut draft = RecipeDraft::new("Bizcocho", 2);
        draft.add_line(1, d("2")).unwrap();
        draft.add_line(2, d("1")).unwrap();
        draft.add_line(1, d("5")).unwrap();

        assert_eq!(draft.lines().len(), 2);
        assert_eq!(draft.lines()[0], RecipeLineItem::new(1, d("5")));
        assert_eq!(draft.lines()[1].ingredient_id, 2);

        assert!(draft.add_line(3, d("0")).is_err());
    }

    #[test]
    fn test_remove_line() {
        let mut draft = RecipeDraft::new("Bizcocho", 2);
        draft.add_line(1, d("2")).unwrap();
        draft.add_line(2, d("1")).unwrap();

        let removed = draft.remove_line(0).unwrap();
        assert_eq!(removed.ingredient_id, 1);
        assert_eq!(draft.lines()[0].ingredient_id, 2);
        assert!(draft.remove_line(5).is_err());
    }

    #[test]
    fn test_summary_states() {
        let catalog = catalog();
        let mut draft = RecipeDraft::new("Bizcocho", 2);

        let empty = draft.summary(&catalog).unwrap();
        assert_eq!(empty.stock_status, DraftStockStatus::Empty);
        assert_eq!(empty.total_cost, Decimal::ZERO);

        draft.add_line(1, d("2")).unwrap();
        let ok = draft.summary(&catalog).unwrap();
        assert_eq!(ok.stock_status, DraftStockStatus::Sufficient);
        assert_eq!(ok.cost_per_portion, d("1.50"));

        draft.add_line(2, d("1")).unwrap();
        let short = draft.summary(&catalog).unwrap();
        assert_eq!(short.stock_status, DraftStockStatus::Insufficient);
        assert_eq!(short.total_cost, d("6.00"));
        assert_eq!(short.cost_per_portion, d("3.00"));
    }

    #[test]
    fn test_set_yield_rejects_zero() {
        let mut draft = RecipeDraft::default();
        assert!(draft.set_yield(0).is_err());
        draft.set_yield(6).unwrap();
        assert_eq!(draft.yield_portions, 6);
    }

    #[test]
    fn test_to_request_validation() {
        let mut draft = RecipeDraft::new("  ", 2);
        assert!(draft.to_request().is_err());

        draft.name = "Flan".to_string();
        assert!(draft.to_request().is_err()); // no ingredients

        draft.add_line(1, d("0.5")).unwrap();
        draft.preparation_time = Some(40);
        let request = draft.to_request().unwrap();
        assert_eq!(request.name, "Flan");
        assert_eq!(request.preparation_time, Some(40));
        assert_eq!(
            request.ingredients,
            vec![NewRecipeLine {
                ingredient_id: 1,
                quantity: d("0.5")
            }]
        );
    }
}
