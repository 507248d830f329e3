use crate::errors::{Result, UtilsError};
use kitchen_core::{Decimal, StockLevel};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::RoundingStrategy;

/// Trait for formatting different types of data
pub trait Formatter<T> {
    fn format(&self, input: T) -> String;
}

// Upper bound keeps `round_dp` inside what Decimal can represent.
const MAX_DECIMALS: u32 = 10;

fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

fn fixed(value: Decimal, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, round(value, decimals))
}

fn check_decimals(decimals: u32) -> Result<()> {
    if decimals > MAX_DECIMALS {
        return Err(UtilsError::Format(format!(
            "At most {} decimal places are supported, got {}",
            MAX_DECIMALS, decimals
        )));
    }
    Ok(())
}

/// Money amounts with a currency symbol, e.g. `€1.50`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    pub symbol: String,
    pub decimals: u32,
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self {
            symbol: "€".to_string(),
            decimals: 2,
        }
    }
}

impl CurrencyFormatter {
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Result<Self> {
        check_decimals(decimals)?;
        Ok(Self {
            symbol: symbol.into(),
            decimals,
        })
    }
}

impl Formatter<Decimal> for CurrencyFormatter {
    fn format(&self, amount: Decimal) -> String {
        let rounded = round(amount, self.decimals);
        if rounded < Decimal::ZERO {
            format!("-{}{}", self.symbol, fixed(-rounded, self.decimals))
        } else {
            format!("{}{}", self.symbol, fixed(rounded, self.decimals))
        }
    }
}

/// Plain fixed-point quantities. Recipes use 3 places, stock uses 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityFormatter {
    pub decimals: u32,
}

impl QuantityFormatter {
    pub const RECIPE: QuantityFormatter = QuantityFormatter { decimals: 3 };
    pub const STOCK: QuantityFormatter = QuantityFormatter { decimals: 2 };

    pub fn new(decimals: u32) -> Result<Self> {
        check_decimals(decimals)?;
        Ok(Self { decimals })
    }
}

impl Formatter<Decimal> for QuantityFormatter {
    fn format(&self, quantity: Decimal) -> String {
        fixed(quantity, self.decimals)
    }
}

/// Percentages with one decimal place, e.g. `37.5%`.
pub struct PercentFormatter;

impl Formatter<Decimal> for PercentFormatter {
    fn format(&self, percentage: Decimal) -> String {
        format!("{}%", fixed(percentage, 1))
    }
}

/// Text progress bar for a stock level, e.g. `[#####-----] 50%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockBarFormatter {
    pub width: usize,
}

impl Default for StockBarFormatter {
    fn default() -> Self {
        Self { width: 10 }
    }
}

impl StockBarFormatter {
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(UtilsError::Format(
                "Stock bar width must be at least 1".to_string(),
            ));
        }
        Ok(Self { width })
    }

    /// Number of filled cells for a percentage in `[0, 100]`.
    pub fn filled_cells(&self, percentage: Decimal) -> usize {
        let clamped = percentage.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED);
        let cells = round(
            clamped * Decimal::from(self.width as u64) / Decimal::ONE_HUNDRED,
            0,
        );
        cells.to_usize().unwrap_or(0).min(self.width)
    }
}

impl Formatter<&StockLevel> for StockBarFormatter {
    fn format(&self, level: &StockLevel) -> String {
        let filled = self.filled_cells(level.percentage);
        format!(
            "[{}{}] {}%",
            "#".repeat(filled),
            "-".repeat(self.width - filled),
            fixed(level.percentage, 0)
        )
    }
}

// Convenience functions
pub fn format_currency(amount: Decimal) -> String {
    CurrencyFormatter::default().format(amount)
}

pub fn format_quantity(quantity: Decimal) -> String {
    QuantityFormatter::RECIPE.format(quantity)
}

pub fn format_stock(stock: Decimal) -> String {
    QuantityFormatter::STOCK.format(stock)
}

pub fn format_percentage(percentage: Decimal) -> String {
    PercentFormatter.format(percentage)
}

pub fn format_stock_bar(level: &StockLevel) -> String {
    StockBarFormatter::default().format(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitchen_core::StockThresholds;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_currency_formatting() {
        let formatter = CurrencyFormatter::default();

        assert_eq!(formatter.format(d("1.5")), "€1.50");
        assert_eq!(formatter.format(d("0")), "€0.00");
        assert_eq!(formatter.format(d("2.005")), "€2.01");
        assert_eq!(formatter.format(d("-3.2")), "-€3.20");

        let dollars = CurrencyFormatter::new("$", 3).unwrap();
        assert_eq!(dollars.format(d("0.1234")), "$0.123");
        assert!(CurrencyFormatter::new("$", 40).is_err());
    }

    #[test]
    fn test_quantity_formatting() {
        assert_eq!(format_quantity(d("0.25")), "0.250");
        assert_eq!(format_quantity(d("1.0005")), "1.001");
        assert_eq!(format_stock(d("12")), "12.00");
        assert_eq!(QuantityFormatter::new(0).unwrap().format(d("2.5")), "3");
    }

    #[test]
    fn test_percentage_formatting() {
        assert_eq!(format_percentage(d("37.5")), "37.5%");
        assert_eq!(format_percentage(d("33.3333")), "33.3%");
        assert_eq!(format_percentage(d("100")), "100.0%");
    }

    #[test]
    fn test_stock_bar() {
        let thresholds = StockThresholds::default();

        assert_eq!(format_stock_bar(&thresholds.level(d("25"))), "[#####-----] 50%");
        assert_eq!(format_stock_bar(&thresholds.level(d("80"))), "[##########] 100%");
        assert_eq!(format_stock_bar(&thresholds.level(d("0"))), "[----------] 0%");

        let narrow = StockBarFormatter::new(4).unwrap();
        assert_eq!(narrow.filled_cells(d("60")), 2);
        assert!(StockBarFormatter::new(0).is_err());
    }
}
