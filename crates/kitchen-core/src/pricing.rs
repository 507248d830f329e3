use crate::catalog::IngredientCatalog;
use crate::errors::{KitchenError, Result};
use crate::models::{Recipe, Unit};
use crate::stock::{producible_portions, StockLevel, StockThresholds};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// A line item priced against the catalog at computation time. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedLineItem {
    pub ingredient_id: i64,
    pub name: String,
    pub unit: Unit,
    pub quantity: Decimal,
    pub cost_per_unit: Decimal,
    pub current_stock: Decimal,
}

/// One row of a cost breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownLine {
    pub item: PricedLineItem,
    pub line_cost: Decimal,
    pub percentage_of_total: Decimal,
    pub sufficient: bool,
    pub stock: StockLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub recipe_name: String,
    pub yield_portions: u32,
    pub total_cost: Decimal,
    pub cost_per_portion: Decimal,
    pub lines: Vec<BreakdownLine>,
    pub all_sufficient: bool,
    pub producible_portions: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaledLine {
    pub ingredient_id: i64,
    pub name: String,
    pub unit: Unit,
    pub original_quantity: Decimal,
    pub scaled_quantity: Decimal,
    pub scaled_cost: Decimal,
    /// Stock in the catalog the recipe was scaled against.
    pub current_stock: Decimal,
}

impl ScaledLine {
    pub fn is_sufficient(&self) -> bool {
        self.current_stock >= self.scaled_quantity
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaledRecipe {
    pub factor: Decimal,
    pub original_yield: u32,
    pub scaled_yield: u32,
    pub original_cost: Decimal,
    pub scaled_cost: Decimal,
    pub lines: Vec<ScaledLine>,
}

fn too_large(what: &str) -> KitchenError {
    KitchenError::invalid(format!("{} is too large to compute", what))
}

/// `quantity * cost_per_unit`
pub fn line_item_cost(item: &PricedLineItem) -> Result<Decimal> {
    item.quantity
        .checked_mul(item.cost_per_unit)
        .ok_or_else(|| too_large(&format!("Cost of ingredient {}", item.ingredient_id)))
}

/// Sum of line costs; zero for no items.
pub fn total_cost(items: &[PricedLineItem]) -> Result<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |sum, item| -> Result<Decimal> {
        sum.checked_add(line_item_cost(item)?)
            .ok_or_else(|| too_large("Recipe total"))
    })
}

pub fn cost_per_portion(items: &[PricedLineItem], yield_portions: i64) -> Result<Decimal> {
    if yield_portions <= 0 {
        return Err(KitchenError::invalid(format!(
            "Yield must be a positive number of portions, got {}",
            yield_portions
        )));
    }

    total_cost(items)?
        .checked_div(Decimal::from(yield_portions))
        .ok_or_else(|| too_large("Cost per portion"))
}

/// Share of `total` taken by this item, in percent, clamped to `[0, 100]`.
/// Returns zero when `total` is zero.
pub fn percentage_of_total(item: &PricedLineItem, total: Decimal) -> Result<Decimal> {
    if total.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let share = line_item_cost(item)?
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| too_large("Cost share"))?;
    Ok(share.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED))
}

pub fn is_sufficient(item: &PricedLineItem) -> bool {
    item.current_stock >= item.quantity
}

/// True when every item is covered by stock; vacuously true for no items.
pub fn all_sufficient(items: &[PricedLineItem]) -> bool {
    items.iter().all(is_sufficient)
}

/// Project a batch of a different size.
///
/// The scaled yield is rounded half away from zero to whole portions.
pub fn scale(
    items: &[PricedLineItem],
    yield_portions: u32,
    factor: Decimal,
) -> Result<ScaledRecipe> {
    if factor <= Decimal::ZERO {
        return Err(KitchenError::invalid(format!(
            "Scale factor must be positive, got {}",
            factor
        )));
    }
    if yield_portions == 0 {
        return Err(KitchenError::invalid("Recipe yield must be positive"));
    }

    let scaled_yield = Decimal::from(yield_portions)
        .checked_mul(factor)
        .and_then(|portions| {
            portions
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u32()
        })
        .ok_or_else(|| {
            KitchenError::invalid(format!(
                "Scaled yield for factor {} does not fit in a portion count",
                factor
            ))
        })?;

    let original_cost = total_cost(items)?;
    let lines = items
        .iter()
        .map(|item| -> Result<ScaledLine> {
            let scaled_quantity = item
                .quantity
                .checked_mul(factor)
                .ok_or_else(|| too_large("Scaled quantity"))?;
            let scaled_cost = scaled_quantity
                .checked_mul(item.cost_per_unit)
                .ok_or_else(|| too_large("Scaled cost"))?;
            Ok(ScaledLine {
                ingredient_id: item.ingredient_id,
                name: item.name.clone(),
                unit: item.unit,
                original_quantity: item.quantity,
                scaled_quantity,
                scaled_cost,
                current_stock: item.current_stock,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let scaled_cost = original_cost
        .checked_mul(factor)
        .ok_or_else(|| too_large("Scaled batch cost"))?;

    Ok(ScaledRecipe {
        factor,
        original_yield: yield_portions,
        scaled_yield,
        original_cost,
        scaled_cost,
        lines,
    })
}

/// Builds full breakdowns for a recipe against a catalog.
///
/// This is the single place both the recipe builder and the recipe detail
/// view get their totals from.
#[derive(Debug, Clone, Default)]
pub struct CostCalculator {
    thresholds: StockThresholds,
}

impl CostCalculator {
    pub fn new(thresholds: StockThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &StockThresholds {
        &self.thresholds
    }

    pub fn breakdown(
        &self,
        catalog: &IngredientCatalog,
        recipe: &Recipe,
    ) -> Result<CostBreakdown> {
        let items = catalog.resolve(&recipe.line_items)?;
        self.breakdown_items(&recipe.name, recipe.yield_portions, items)
    }

    pub fn breakdown_items(
        &self,
        recipe_name: &str,
        yield_portions: u32,
        items: Vec<PricedLineItem>,
    ) -> Result<CostBreakdown> {
        let cost_per_portion = cost_per_portion(&items, i64::from(yield_portions))?;
        let total = total_cost(&items)?;
        let all_sufficient = all_sufficient(&items);
        let producible = producible_portions(&items, yield_portions);

        let lines = items
            .into_iter()
            .map(|item| -> Result<BreakdownLine> {
                Ok(BreakdownLine {
                    line_cost: line_item_cost(&item)?,
                    percentage_of_total: percentage_of_total(&item, total)?,
                    sufficient: is_sufficient(&item),
                    stock: self.thresholds.level(item.current_stock),
                    item,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CostBreakdown {
            recipe_name: recipe_name.to_string(),
            yield_portions,
            total_cost: total,
            cost_per_portion,
            lines,
            all_sufficient,
            producible_portions: producible,
        })
    }

    pub fn scale(
        &self,
        catalog: &IngredientCatalog,
        recipe: &Recipe,
        factor: Decimal,
    ) -> Result<ScaledRecipe> {
        let items = catalog.resolve(&recipe.line_items)?;
        scale(&items, recipe.yield_portions, factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, RecipeLineItem};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(id: i64, quantity: &str, cost: &str, stock: &str) -> PricedLineItem {
        PricedLineItem {
            ingredient_id: id,
            name: format!("ingredient-{}", id),
            unit: Unit::Units,
            quantity: d(quantity),
            cost_per_unit: d(cost),
            current_stock: d(stock),
        }
    }

    fn scenario() -> Vec<PricedLineItem> {
        vec![item(1, "2", "1.50", "10"), item(2, "1", "3.00", "0")]
    }

    #[test]
    fn test_reference_scenario() {
        let items = scenario();
        let total = total_cost(&items).unwrap();

        assert_eq!(total, d("6.00"));
        assert_eq!(cost_per_portion(&items, 2).unwrap(), d("3.00"));
        assert!(is_sufficient(&items[0]));
        assert!(!is_sufficient(&items[1]));
        assert!(!all_sufficient(&items));
        assert_eq!(percentage_of_total(&items[0], total).unwrap(), d("50.0"));
        assert_eq!(percentage_of_total(&items[1], total).unwrap(), d("50.0"));
    }

    #[test]
    fn test_total_cost_is_order_independent() {
        let items = vec![
            item(1, "0.250", "4.20", "1"),
            item(2, "3", "0.33", "1"),
            item(3, "1.5", "12.99", "1"),
            item(4, "0", "7.00", "1"),
        ];
        let expected = total_cost(&items).unwrap();
        assert_eq!(expected, d("21.525"));
        assert!(expected >= Decimal::ZERO);

        let mut reversed = items.clone();
        reversed.reverse();
        assert_eq!(total_cost(&reversed).unwrap(), expected);

        let mut rotated = items.clone();
        rotated.rotate_left(2);
        assert_eq!(total_cost(&rotated).unwrap(), expected);
    }

    #[test]
    fn test_total_cost_of_nothing_is_zero() {
        assert_eq!(total_cost(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_cost_per_portion_rejects_non_positive_yield() {
        let items = scenario();
        for bad in [0, -1, -100] {
            let err = cost_per_portion(&items, bad).unwrap_err();
            assert!(err.is_invalid_argument(), "yield {} should be rejected", bad);
        }
    }

    #[test]
    fn test_percentage_with_zero_total() {
        let items = vec![item(1, "2", "0", "10"), item(2, "1", "0", "10")];
        let total = total_cost(&items).unwrap();
        assert!(total.is_zero());
        for line in &items {
            assert_eq!(percentage_of_total(line, total).unwrap(), Decimal::ZERO);
        }
    }

    #[test]
    fn test_percentages_sum_to_one_hundred() {
        let items = vec![
            item(1, "1", "1", "0"),
            item(2, "1", "1", "0"),
            item(3, "1", "1", "0"),
        ];
        let total = total_cost(&items).unwrap();
        let sum: Decimal = items.iter().map(|i| percentage_of_total(i, total).unwrap()).sum();

        let tolerance = d("0.0000001");
        assert!((sum - Decimal::ONE_HUNDRED).abs() < tolerance, "sum was {}", sum);
    }

    #[test]
    fn test_percentage_is_clamped() {
        // A total smaller than the line itself cannot push the share past 100.
        let line = item(1, "2", "5", "0");
        assert_eq!(percentage_of_total(&line, d("5")).unwrap(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_sufficiency_is_monotonic_in_stock() {
        let mut line = item(1, "4", "1", "0");
        let mut was_sufficient = false;
        for stock in ["0", "1", "3.999", "4", "4.001", "100"] {
            line.current_stock = d(stock);
            let now = is_sufficient(&line);
            assert!(!(was_sufficient && !now), "flipped back at stock {}", stock);
            was_sufficient = now;
        }
        assert!(was_sufficient);
    }

    #[test]
    fn test_all_sufficient_is_vacuously_true() {
        assert!(all_sufficient(&[]));
    }

    #[test]
    fn test_scale_doubles_yield_and_cost() {
        // yield 4, total 20.00
        let items = vec![item(1, "4", "2.50", "10"), item(2, "2", "5.00", "10")];
        assert_eq!(total_cost(&items).unwrap(), d("20.00"));

        let scaled = scale(&items, 4, d("2")).unwrap();
        assert_eq!(scaled.scaled_yield, 8);
        assert_eq!(scaled.scaled_cost, d("40.00"));
        assert_eq!(scaled.lines[0].scaled_quantity, d("8"));
        assert_eq!(scaled.lines[1].scaled_cost, d("20.00"));
    }

    #[test]
    fn test_scale_rounds_yield_half_away_from_zero() {
        let items = scenario();
        assert_eq!(scale(&items, 3, d("1.5")).unwrap().scaled_yield, 5); // 4.5
        assert_eq!(scale(&items, 4, d("0.3")).unwrap().scaled_yield, 1); // 1.2
        assert_eq!(scale(&items, 4, d("0.1")).unwrap().scaled_yield, 0); // 0.4
    }

    #[test]
    fn test_scale_rejects_non_positive_factor() {
        let items = scenario();
        assert!(scale(&items, 4, d("0")).unwrap_err().is_invalid_argument());
        assert!(scale(&items, 4, d("-1")).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_breakdown_against_catalog() {
        let ingredient = |id: i64, name: &str, cost: &str, stock: &str| Ingredient {
            id,
            name: name.to_string(),
            unit: Unit::Kilograms,
            unit_display: None,
            cost_per_unit: d(cost),
            current_stock: d(stock),
            created_at: None,
            updated_at: None,
        };
        let catalog = IngredientCatalog::new(vec![
            ingredient(1, "Harina", "1.50", "10"),
            ingredient(2, "Mantequilla", "3.00", "0"),
        ]);
        let recipe = Recipe {
            id: None,
            name: "Masa".to_string(),
            description: String::new(),
            yield_portions: 2,
            preparation_time: Some(20),
            line_items: vec![
                RecipeLineItem::new(1, d("2")),
                RecipeLineItem::new(2, d("1")),
            ],
        };

        let breakdown = CostCalculator::default().breakdown(&catalog, &recipe).unwrap();
        assert_eq!(breakdown.total_cost, d("6.00"));
        assert_eq!(breakdown.cost_per_portion, d("3.00"));
        assert!(!breakdown.all_sufficient);
        assert_eq!(breakdown.producible_portions, 0);
        assert_eq!(breakdown.lines[0].item.name, "Harina");
        assert_eq!(breakdown.lines[0].percentage_of_total, d("50"));
        assert!(breakdown.lines[0].sufficient);
        assert!(!breakdown.lines[1].sufficient);
    }

    #[test]
    fn test_breakdown_rejects_zero_yield() {
        let err = CostCalculator::default()
            .breakdown_items("empty", 0, scenario())
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    fn stocked(id: i64, name: &str, cost: &str, stock: &str) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            unit: Unit::Grams,
            unit_display: None,
            cost_per_unit: d(cost),
            current_stock: d(stock),
            created_at: None,
            updated_at: None,
        }
    }

    fn bread(lines: Vec<RecipeLineItem>) -> Recipe {
        Recipe {
            id: Some(1),
            name: "Pan".to_string(),
            description: String::new(),
            yield_portions: 4,
            preparation_time: None,
            line_items: lines,
        }
    }

    #[test]
    fn test_calculator_scale_against_catalog() {
        let catalog = IngredientCatalog::new(vec![
            stocked(1, "Harina", "2.50", "10"),
            stocked(2, "Levadura", "5.00", "3"),
        ]);
        let recipe = bread(vec![
            RecipeLineItem::new(1, d("4")),
            RecipeLineItem::new(2, d("2")),
        ]);

        let scaled = CostCalculator::default()
            .scale(&catalog, &recipe, d("2"))
            .unwrap();
        assert_eq!(scaled.original_yield, 4);
        assert_eq!(scaled.scaled_yield, 8);
        assert_eq!(scaled.original_cost, d("20.00"));
        assert_eq!(scaled.scaled_cost, d("40.00"));

        // Stock comes from the catalog: 10 covers 8, 3 does not cover 4.
        assert_eq!(scaled.lines[0].current_stock, d("10"));
        assert!(scaled.lines[0].is_sufficient());
        assert!(!scaled.lines[1].is_sufficient());
    }

    #[test]
    fn test_calculator_scale_unknown_ingredient() {
        let catalog = IngredientCatalog::new(vec![stocked(1, "Harina", "2.50", "10")]);
        let recipe = bread(vec![RecipeLineItem::new(9, d("1"))]);

        let err = CostCalculator::default()
            .scale(&catalog, &recipe, d("2"))
            .unwrap_err();
        assert!(matches!(err, KitchenError::NotFound(_)));
    }

    #[test]
    fn test_huge_factor_is_an_error_not_a_panic() {
        let factor = crate::parsing::parse_scale_factor("79228162514264337593543950335").unwrap();
        let items = vec![item(1, "1", "1", "1")];

        let err = scale(&items, 4, factor).unwrap_err();
        assert!(err.is_invalid_argument());

        // The yield fits but the quantities do not.
        let heavy = vec![item(1, "1000000000000000000000000000", "1", "1")];
        let err = scale(&heavy, 1, d("100")).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_huge_quantities_are_errors_not_panics() {
        let quantity = crate::parsing::parse_quantity("1000000000000000000000000000").unwrap();
        let mut line = item(1, "1", "1", "0");
        line.quantity = quantity;

        // Fits on its own, so the share is computed.
        let total = total_cost(std::slice::from_ref(&line)).unwrap();
        assert_eq!(percentage_of_total(&line, total).unwrap(), Decimal::ONE_HUNDRED);

        line.cost_per_unit = d("100");
        assert!(line_item_cost(&line).unwrap_err().is_invalid_argument());
        assert!(total_cost(&[line.clone()]).unwrap_err().is_invalid_argument());
        assert!(percentage_of_total(&line, d("1")).unwrap_err().is_invalid_argument());
        assert!(CostCalculator::default()
            .breakdown_items("huge", 1, vec![line])
            .unwrap_err()
            .is_invalid_argument());

        let sum_overflows = vec![
            item(1, "50000000000000000000000000000", "1", "0"),
            item(2, "50000000000000000000000000000", "1", "0"),
        ];
        assert!(total_cost(&sum_overflows).unwrap_err().is_invalid_argument());
    }
}
