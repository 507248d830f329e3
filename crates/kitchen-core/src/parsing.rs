//! Validated parsing of user-entered values.
//!
//! Everything typed into the CLI passes through here before reaching the
//! calculator, so the calculator can assume non-negative magnitudes.

use crate::errors::{KitchenError, Result};
use crate::models::{RecipeLineItem, Unit};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a decimal number. Accepts a comma as decimal separator (`1,5`).
pub fn parse_decimal(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(KitchenError::invalid("Expected a number, got an empty value"));
    }

    let normalized = trimmed.replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|_| KitchenError::invalid(format!("Invalid number: {}", input)))
}

/// A quantity required by a recipe: strictly positive.
pub fn parse_quantity(input: &str) -> Result<Decimal> {
    let value = parse_decimal(input)?;
    if value <= Decimal::ZERO {
        return Err(KitchenError::invalid(format!(
            "Quantity must be greater than zero, got {}",
            input.trim()
        )));
    }
    Ok(value)
}

/// A cost or stock amount: zero or more.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let value = parse_decimal(input)?;
    if value < Decimal::ZERO {
        return Err(KitchenError::invalid(format!(
            "Amount cannot be negative, got {}",
            input.trim()
        )));
    }
    Ok(value)
}

pub fn parse_yield_portions(input: &str) -> Result<u32> {
    let portions = input
        .trim()
        .parse::<u32>()
        .map_err(|_| KitchenError::invalid(format!("Invalid number of portions: {}", input)))?;

    if portions == 0 {
        return Err(KitchenError::invalid("Yield must be at least one portion"));
    }
    Ok(portions)
}

pub fn parse_scale_factor(input: &str) -> Result<Decimal> {
    let factor = parse_decimal(input)?;
    if factor <= Decimal::ZERO {
        return Err(KitchenError::invalid(format!(
            "Scale factor must be positive, got {}",
            input.trim()
        )));
    }
    Ok(factor)
}

/// Preparation time in minutes; blank means "not specified".
pub fn parse_preparation_time(input: &str) -> Result<Option<u32>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| KitchenError::invalid(format!("Invalid preparation time: {}", input)))
}

pub fn parse_unit(input: &str) -> Result<Unit> {
    Unit::from_str(input)
}

/// Parse `"<ingredient_id>=<quantity>"`, e.g. `3=0.25`.
pub fn parse_line_item_spec(input: &str) -> Result<RecipeLineItem> {
    let parts: Vec<&str> = input.trim().splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(KitchenError::invalid(format!(
            "Invalid ingredient format: '{}'. Use INGREDIENT_ID=QUANTITY",
            input
        )));
    }

    let ingredient_id = parts[0]
        .trim()
        .parse::<i64>()
        .map_err(|_| KitchenError::invalid(format!("Invalid ingredient id: {}", parts[0])))?;
    let quantity = parse_quantity(parts[1])?;

    Ok(RecipeLineItem::new(ingredient_id, quantity))
}

/// Parse list index from user input (1-based to 0-based)
pub fn parse_index(input: &str, max_index: usize) -> Result<usize> {
    let index = input
        .trim()
        .parse::<usize>()
        .map_err(|_| KitchenError::invalid(format!("Invalid index: {}", input)))?;

    if index == 0 || index > max_index {
        return Err(KitchenError::invalid(format!(
            "Index must be between 1 and {}",
            max_index
        )));
    }

    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.50").unwrap(), Decimal::new(150, 2));
        assert_eq!(parse_decimal(" 1,5 ").unwrap(), Decimal::new(15, 1));
        assert!(parse_decimal("").is_err());
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("1.2.3").is_err());
    }

    #[test]
    fn test_parse_quantity_rejects_zero_and_negative() {
        assert_eq!(parse_quantity("0.250").unwrap(), Decimal::new(250, 3));
        assert!(parse_quantity("0").unwrap_err().is_invalid_argument());
        assert!(parse_quantity("-2").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_parse_amount_allows_zero() {
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("-0").unwrap(), Decimal::ZERO);
        assert!(parse_amount("-0.01").is_err());
    }

    #[test]
    fn test_parse_yield_and_factor() {
        assert_eq!(parse_yield_portions("4").unwrap(), 4);
        assert!(parse_yield_portions("0").is_err());
        assert!(parse_yield_portions("-1").is_err());
        assert!(parse_yield_portions("2.5").is_err());

        assert_eq!(parse_scale_factor("1.5").unwrap(), Decimal::new(15, 1));
        assert!(parse_scale_factor("0").is_err());
        assert!(parse_scale_factor("-1").is_err());
    }

    #[test]
    fn test_parse_preparation_time() {
        assert_eq!(parse_preparation_time("").unwrap(), None);
        assert_eq!(parse_preparation_time("45").unwrap(), Some(45));
        assert!(parse_preparation_time("soon").is_err());
    }

    #[test]
    fn test_parse_line_item_spec() {
        let item = parse_line_item_spec("3=0.25").unwrap();
        assert_eq!(item.ingredient_id, 3);
        assert_eq!(item.quantity, Decimal::new(25, 2));

        assert!(parse_line_item_spec("3").is_err());
        assert!(parse_line_item_spec("x=1").is_err());
        assert!(parse_line_item_spec("3=0").is_err());
        assert!(parse_line_item_spec("3=-1").is_err());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("1", 5).unwrap(), 0);
        assert_eq!(parse_index("5", 5).unwrap(), 4);
        assert!(parse_index("0", 5).is_err());
        assert!(parse_index("6", 5).is_err());
        assert!(parse_index("abc", 5).is_err());
    }
}
