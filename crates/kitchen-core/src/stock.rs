use crate::errors::{KitchenError, Result};
use crate::models::Ingredient;
use crate::pricing::PricedLineItem;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Coarse stock classification used for badges and bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for StockTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StockTier::Low => "low",
            StockTier::Medium => "medium",
            StockTier::High => "high",
        };
        f.write_str(label)
    }
}

/// Tier of a stock amount plus the fill percentage of its display bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub tier: StockTier,
    /// `stock / reference_capacity * 100`, capped at 100. Visual only.
    pub percentage: Decimal,
}

/// Tier boundaries. `stock < low` is Low, `stock < medium` is Medium, the rest High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockThresholds {
    pub low: Decimal,
    pub medium: Decimal,
    /// Baseline that maps to a full bar. Not a business limit.
    pub reference_capacity: Decimal,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            low: Decimal::new(5, 0),
            medium: Decimal::new(20, 0),
            reference_capacity: Decimal::new(50, 0),
        }
    }
}

impl StockThresholds {
    pub fn new(low: Decimal, medium: Decimal, reference_capacity: Decimal) -> Result<Self> {
        if low < Decimal::ZERO || medium < Decimal::ZERO {
            return Err(KitchenError::invalid("Stock thresholds cannot be negative"));
        }
        if low > medium {
            return Err(KitchenError::invalid(format!(
                "Low threshold ({}) must not exceed medium threshold ({})",
                low, medium
            )));
        }
        if reference_capacity <= Decimal::ZERO {
            return Err(KitchenError::invalid(
                "Reference capacity must be positive",
            ));
        }
        Ok(Self {
            low,
            medium,
            reference_capacity,
        })
    }

    pub fn tier(&self, stock: Decimal) -> StockTier {
        if stock < self.low {
            StockTier::Low
        } else if stock < self.medium {
            StockTier::Medium
        } else {
            StockTier::High
        }
    }

    pub fn level(&self, stock: Decimal) -> StockLevel {
        let percentage = if self.reference_capacity <= Decimal::ZERO || stock <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            match stock.checked_div(self.reference_capacity) {
                Some(ratio) => ratio
                    .checked_mul(ONE_HUNDRED)
                    .map_or(ONE_HUNDRED, |percent| percent.min(ONE_HUNDRED)),
                // Only a stock far beyond the capacity overflows.
                None => ONE_HUNDRED,
            }
        };

        StockLevel {
            tier: self.tier(stock),
            percentage,
        }
    }
}

/// Classify with the default 5/20 thresholds.
pub fn stock_tier(stock: Decimal) -> StockTier {
    StockThresholds::default().tier(stock)
}

pub fn stock_level(stock: Decimal, thresholds: &StockThresholds) -> StockLevel {
    thresholds.level(stock)
}

/// Ingredients whose stock is strictly below `threshold`.
pub fn low_stock(ingredients: &[Ingredient], threshold: Decimal) -> Vec<Ingredient> {
    ingredients
        .iter()
        .filter(|ingredient| ingredient.current_stock < threshold)
        .cloned()
        .collect()
}

/// Whole batches the current stock allows, expressed in portions.
///
/// Items with a zero quantity do not constrain production. A recipe with no
/// constraining items yields 0.
pub fn producible_portions(items: &[PricedLineItem], yield_portions: u32) -> u32 {
    let batches = items
        .iter()
        .filter(|item| item.quantity > Decimal::ZERO)
        .map(|item| {
            item.current_stock
                .checked_div(item.quantity)
                .unwrap_or(Decimal::MAX)
        })
        .min();

    match batches {
        Some(batches) => batches
            .floor()
            .to_u32()
            .unwrap_or(u32::MAX)
            .saturating_mul(yield_portions),
        None => 0,
    }
}
