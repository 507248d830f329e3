use crate::{
    config::Config,
    display::{display_low_stock_list, print_success, print_warning},
    CliError, Result,
};
use colored::Colorize;
use kitchen_core::{Ingredient, RecipeInfo};
use kitchen_utils::Formatter;
use log::debug;

use super::kitchen_from_config;

const RECENT_RECIPES: usize = 3;
const LOW_STOCK_PREVIEW: usize = 5;

/// Overview of the kitchen: totals, the newest recipes and what is running out.
pub async fn handle(config: &Config) -> Result<()> {
    let kitchen = kitchen_from_config(config)?;

    if !kitchen.test_connection().await? {
        return Err(CliError::OperationFailed(format!(
            "Cannot reach the kitchen API at {}",
            kitchen.client().base_url()
        )));
    }

    let threshold = config.home_threshold();
    let (ingredients, recipes, low) = tokio::try_join!(
        kitchen.client().get_ingredients(),
        kitchen.client().get_recipes(),
        kitchen.low_stock(threshold)
    )?;
    debug!(
        "{} ingredients, {} recipes, {} below {}",
        ingredients.len(),
        recipes.len(),
        low.len(),
        threshold
    );

    let currency = config.currency_formatter();

    println!("{}", "Kitchen overview".bold().blue());
    println!("  {}: {}", "Ingredients".bold(), ingredients.len());
    println!("  {}: {}", "Recipes".bold(), recipes.len());
    println!();

    println!("{}", "Latest recipes".bold());
    let latest = newest_recipes(&recipes, RECENT_RECIPES);
    if latest.is_empty() {
        println!("  {}", "No recipes yet.".yellow());
    }
    for info in latest {
        println!(
            "  {} ({} portions, {} per portion)",
            info.recipe.name,
            info.recipe.yield_portions,
            currency.format(info.cost_per_portion)
        );
    }
    println!();

    let preview = low_stock_preview(&low, LOW_STOCK_PREVIEW);
    if preview.is_empty() {
        print_success(&format!("No ingredient is below {}", threshold.normalize()));
        return Ok(());
    }

    print_warning(&format!(
        "{} ingredient(s) below {}",
        low.len(),
        threshold.normalize()
    ));
    display_low_stock_list(&preview, kitchen.calculator().thresholds());
    if low.len() > preview.len() {
        println!(
            "  {}",
            format!("... and {} more", low.len() - preview.len()).dimmed()
        );
    }
    Ok(())
}

/// The `count` most recently created recipes, newest first.
fn newest_recipes(recipes: &[RecipeInfo], count: usize) -> Vec<&RecipeInfo> {
    let mut sorted: Vec<&RecipeInfo> = recipes.iter().collect();
    sorted.sort_by(|a, b| b.recipe.id.cmp(&a.recipe.id));
    sorted.truncate(count);
    sorted
}

/// Lowest stock first, at most `count` entries.
fn low_stock_preview(low: &[Ingredient], count: usize) -> Vec<Ingredient> {
    let mut sorted = low.to_vec();
    sorted.sort_by(|a, b| {
        a.current_stock
            .cmp(&b.current_stock)
            .then_with(|| a.name.cmp(&b.name))
    });
    sorted.truncate(count);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitchen_core::{Decimal, Recipe, Unit};

    fn recipe(id: i64, name: &str) -> RecipeInfo {
        RecipeInfo {
            recipe: Recipe {
                id: Some(id),
                name: name.to_string(),
                description: String::new(),
                yield_portions: 4,
                preparation_time: None,
                line_items: Vec::new(),
            },
            batch_cost: Decimal::ZERO,
            cost_per_portion: Decimal::ZERO,
            producible_portions: 0,
            ingredients: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn ingredient(id: i64, name: &str, stock: i64) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            unit: Unit::Kilograms,
            unit_display: None,
            cost_per_unit: Decimal::ONE,
            current_stock: Decimal::new(stock, 0),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_newest_recipes_by_id() {
        let recipes = vec![
            recipe(2, "Pan"),
            recipe(7, "Tarta"),
            recipe(1, "Sopa"),
            recipe(5, "Flan"),
        ];

        let names: Vec<&str> = newest_recipes(&recipes, 3)
            .iter()
            .map(|info| info.recipe.name.as_str())
            .collect();
        assert_eq!(names, vec!["Tarta", "Flan", "Pan"]);
        assert!(newest_recipes(&[], 3).is_empty());
    }

    #[test]
    fn test_low_stock_preview_caps_and_orders() {
        let low: Vec<Ingredient> = (1..=7)
            .map(|i| ingredient(i, &format!("item{}", i), 20 - i))
            .collect();

        let preview = low_stock_preview(&low, 5);
        assert_eq!(preview.len(), 5);
        assert_eq!(preview[0].id, 7);
        assert_eq!(preview[4].id, 3);
    }
}
