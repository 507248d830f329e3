use crate::{CliError, Result};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use kitchen_core::{
    CostBreakdown, CostBreakdownResponse, DraftStockStatus, DraftSummary, Ingredient,
    IngredientCatalog, RecipeDraft, RecipeInfo, ScaledRecipe, ScaledRecipeResponse, StockLevel,
    StockThresholds, StockTier,
};
use kitchen_utils::{
    format_percentage, format_quantity, format_stock, CurrencyFormatter, Formatter,
    StockBarFormatter,
};

/// Width of a cell as seen on the terminal, ignoring ANSI color sequences.
pub fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for ch in text.chars() {
        if in_escape {
            if ch == 'm' {
                in_escape = false;
            }
        } else if ch == '\u{1b}' {
            in_escape = true;
        } else {
            width += 1;
        }
    }
    width
}

/// Table formatting utilities
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    max_widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        let max_widths = headers.iter().map(|h| visible_width(h)).collect();
        Self {
            headers,
            rows: Vec::new(),
            max_widths,
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if i < self.max_widths.len() {
                self.max_widths[i] = self.max_widths[i].max(visible_width(cell));
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.separator('┌', '┬', '┐'));
        out.push_str(&self.line(&self.headers, true));
        out.push_str(&self.separator('├', '┼', '┤'));
        for row in &self.rows {
            out.push_str(&self.line(row, false));
        }
        out.push_str(&self.separator('└', '┴', '┘'));
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }

    fn separator(&self, left: char, middle: char, right: char) -> String {
        let segments: Vec<String> = self
            .max_widths
            .iter()
            .map(|&width| "─".repeat(width + 2))
            .collect();
        format!("{}{}{}\n", left, segments.join(&middle.to_string()), right)
    }

    fn line(&self, cells: &[String], bold: bool) -> String {
        let mut out = String::from("│");
        for (i, &width) in self.max_widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let padding = " ".repeat(width.saturating_sub(visible_width(cell)));
            let text = if bold {
                cell.bold().to_string()
            } else {
                cell.to_string()
            };
            out.push_str(&format!(" {}{} │", text, padding));
        }
        out.push('\n');
        out
    }
}

fn tier_label(tier: StockTier) -> String {
    match tier {
        StockTier::Low => "low".red().to_string(),
        StockTier::Medium => "medium".yellow().to_string(),
        StockTier::High => "high".green().to_string(),
    }
}

fn stock_bar(level: &StockLevel) -> String {
    let bar = StockBarFormatter::default().format(level);
    match level.tier {
        StockTier::Low => bar.red().to_string(),
        StockTier::Medium => bar.yellow().to_string(),
        StockTier::High => bar.green().to_string(),
    }
}

fn sufficiency_mark(sufficient: bool) -> String {
    if sufficient {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

/// Display ingredients in a formatted table
pub fn display_ingredients_table(
    ingredients: &[Ingredient],
    thresholds: &StockThresholds,
    currency: &CurrencyFormatter,
) {
    if ingredients.is_empty() {
        println!("{}", "No ingredients found.".yellow());
        return;
    }

    let mut table = Table::new(vec![
        "ID".to_string(),
        "Name".to_string(),
        "Unit".to_string(),
        "Cost/unit".to_string(),
        "Stock".to_string(),
        "Level".to_string(),
        "Tier".to_string(),
    ]);

    for ingredient in ingredients {
        let level = thresholds.level(ingredient.current_stock);
        table.add_row(vec![
            ingredient.id.to_string(),
            ingredient.name.clone(),
            ingredient.unit_label().to_string(),
            currency.format(ingredient.cost_per_unit),
            format_stock(ingredient.current_stock),
            stock_bar(&level),
            tier_label(level.tier),
        ]);
    }

    table.print();
}

/// Display detailed ingredient information
pub fn display_ingredient_details(
    ingredient: &Ingredient,
    thresholds: &StockThresholds,
    currency: &CurrencyFormatter,
) {
    let level = thresholds.level(ingredient.current_stock);

    println!("{}", format!("Ingredient: {}", ingredient.name).bold().blue());
    println!("  {}: {}", "ID".bold(), ingredient.id);
    println!(
        "  {}: {} ({})",
        "Unit".bold(),
        ingredient.unit_label(),
        ingredient.unit.code()
    );
    println!(
        "  {}: {} per {}",
        "Cost".bold(),
        currency.format(ingredient.cost_per_unit),
        ingredient.unit.code()
    );
    println!(
        "  {}: {} {}",
        "Stock".bold(),
        format_stock(ingredient.current_stock),
        ingredient.unit.code()
    );
    println!(
        "  {}: {} {}",
        "Level".bold(),
        stock_bar(&level),
        tier_label(level.tier)
    );

    if let Some(created_at) = ingredient.created_at {
        println!(
            "  {}: {}",
            "Created".bold(),
            created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    if let Some(updated_at) = ingredient.updated_at {
        println!(
            "  {}: {}",
            "Updated".bold(),
            updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    println!();
}

/// Display recipes in a formatted table
pub fn display_recipes_table(recipes: &[RecipeInfo], currency: &CurrencyFormatter) {
    if recipes.is_empty() {
        println!("{}", "No recipes found.".yellow());
        return;
    }

    let mut table = Table::new(vec![
        "ID".to_string(),
        "Name".to_string(),
        "Portions".to_string(),
        "Prep".to_string(),
        "Batch cost".to_string(),
        "Per portion".to_string(),
        "Producible".to_string(),
    ]);

    for info in recipes {
        let producible = if info.producible_portions > 0 {
            info.producible_portions.to_string().green().to_string()
        } else {
            "0".red().to_string()
        };

        table.add_row(vec![
            info.recipe
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            info.recipe.name.clone(),
            info.recipe.yield_portions.to_string(),
            info.recipe
                .preparation_time
                .map(|m| format!("{} min", m))
                .unwrap_or_else(|| "N/A".to_string()),
            currency.format(info.batch_cost),
            currency.format(info.cost_per_portion),
            producible,
        ]);
    }

    table.print();
}

/// Recipe header shared by the detail views
pub fn display_recipe_header(info: &RecipeInfo) {
    let recipe = &info.recipe;
    println!("{}", format!("Recipe: {}", recipe.name).bold().blue());
    if let Some(id) = recipe.id {
        println!("  {}: {}", "ID".bold(), id);
    }
    if !recipe.description.is_empty() {
        println!("  {}: {}", "Description".bold(), recipe.description);
    }
    println!("  {}: {}", "Portions".bold(), recipe.yield_portions);
    if let Some(minutes) = recipe.preparation_time {
        println!("  {}: {} min", "Preparation".bold(), minutes);
    }
    println!();
}

/// Display a locally computed cost breakdown
pub fn display_cost_breakdown(breakdown: &CostBreakdown, currency: &CurrencyFormatter) {
    let mut table = Table::new(vec![
        "Ingredient".to_string(),
        "Quantity".to_string(),
        "Cost/unit".to_string(),
        "Cost".to_string(),
        "Share".to_string(),
        "Stock".to_string(),
        "Enough".to_string(),
    ]);

    for line in &breakdown.lines {
        table.add_row(vec![
            line.item.name.clone(),
            format!("{} {}", format_quantity(line.item.quantity), line.item.unit.code()),
            currency.format(line.item.cost_per_unit),
            currency.format(line.line_cost),
            format_percentage(line.percentage_of_total),
            format!(
                "{} {}",
                format_stock(line.item.current_stock),
                tier_label(line.stock.tier)
            ),
            sufficiency_mark(line.sufficient),
        ]);
    }

    if table.is_empty() {
        println!("{}", "This recipe has no ingredients.".yellow());
    } else {
        table.print();
    }

    println!(
        "  {}: {}",
        "Batch cost".bold(),
        currency.format(breakdown.total_cost)
    );
    println!(
        "  {}: {} ({} portions)",
        "Per portion".bold(),
        currency.format(breakdown.cost_per_portion),
        breakdown.yield_portions
    );
    println!(
        "  {}: {}",
        "Producible portions".bold(),
        breakdown.producible_portions
    );

    if breakdown.all_sufficient {
        print_success("Stock covers one full batch");
    } else {
        print_warning("Not enough stock for one full batch");
    }
}

/// Display the breakdown returned by the server
pub fn display_server_breakdown(breakdown: &CostBreakdownResponse, currency: &CurrencyFormatter) {
    println!(
        "{}",
        format!("Server breakdown: {}", breakdown.recipe_name)
            .bold()
            .blue()
    );

    let mut table = Table::new(vec![
        "Ingredient".to_string(),
        "Quantity".to_string(),
        "Cost/unit".to_string(),
        "Cost".to_string(),
        "Share".to_string(),
    ]);

    for entry in &breakdown.ingredients {
        table.add_row(vec![
            entry.name.clone(),
            format!("{} {}", format_quantity(entry.quantity), entry.unit),
            currency.format(entry.cost_per_unit),
            currency.format(entry.total_cost),
            format_percentage(entry.percentage_of_total),
        ]);
    }

    table.print();
    println!(
        "  {}: {}",
        "Batch cost".bold(),
        currency.format(breakdown.batch_cost)
    );
    println!(
        "  {}: {} ({} portions)",
        "Per portion".bold(),
        currency.format(breakdown.cost_per_portion),
        breakdown.yield_portions
    );
}

/// Display a locally scaled recipe
pub fn display_scaled_recipe(name: &str, scaled: &ScaledRecipe, currency: &CurrencyFormatter) {
    println!(
        "{}",
        format!("{} × {}", name, scaled.factor.normalize()).bold().blue()
    );

    let mut table = Table::new(vec![
        "Ingredient".to_string(),
        "Original".to_string(),
        "Scaled".to_string(),
        "Scaled cost".to_string(),
        "Enough".to_string(),
    ]);

    for line in &scaled.lines {
        table.add_row(vec![
            line.name.clone(),
            format!("{} {}", format_quantity(line.original_quantity), line.unit.code()),
            format!("{} {}", format_quantity(line.scaled_quantity), line.unit.code()),
            currency.format(line.scaled_cost),
            sufficiency_mark(line.is_sufficient()),
        ]);
    }

    table.print();
    println!(
        "  {}: {} → {}",
        "Portions".bold(),
        scaled.original_yield,
        scaled.scaled_yield
    );
    println!(
        "  {}: {} → {}",
        "Batch cost".bold(),
        currency.format(scaled.original_cost),
        currency.format(scaled.scaled_cost)
    );
}

/// Display the scaling returned by the server
pub fn display_server_scaled(scaled: &ScaledRecipeResponse, currency: &CurrencyFormatter) {
    println!(
        "{}",
        format!(
            "{} × {} (server)",
            scaled.recipe_name,
            scaled.scale_factor.normalize()
        )
        .bold()
        .blue()
    );

    let mut table = Table::new(vec![
        "Ingredient".to_string(),
        "Original".to_string(),
        "Scaled".to_string(),
        "Scaled cost".to_string(),
    ]);

    for entry in &scaled.scaled_ingredients {
        table.add_row(vec![
            entry.name.clone(),
            format!("{} {}", format_quantity(entry.original_quantity), entry.unit),
            format!("{} {}", format_quantity(entry.scaled_quantity), entry.unit),
            currency.format(entry.scaled_cost),
        ]);
    }

    table.print();
    println!(
        "  {}: {} → {}",
        "Portions".bold(),
        scaled.original_yield,
        scaled.scaled_yield
    );
    println!(
        "  {}: {} → {}",
        "Batch cost".bold(),
        currency.format(scaled.original_batch_cost),
        currency.format(scaled.scaled_batch_cost)
    );
}

/// Display a recipe under construction with its live totals
pub fn display_draft(
    draft: &RecipeDraft,
    catalog: &IngredientCatalog,
    summary: &DraftSummary,
    currency: &CurrencyFormatter,
) {
    println!("{}", format!("Draft: {}", draft.name).bold().blue());

    if draft.is_empty() {
        println!("  {}", "No ingredients yet.".yellow());
    } else {
        let mut table = Table::new(vec![
            "#".to_string(),
            "Ingredient".to_string(),
            "Quantity".to_string(),
            "Cost".to_string(),
            "Enough".to_string(),
        ]);

        for (i, line) in draft.lines().iter().enumerate() {
            let (name, unit, cost, sufficient) = match catalog.get(line.ingredient_id) {
                Some(ingredient) => (
                    ingredient.name.clone(),
                    ingredient.unit.code().to_string(),
                    line.quantity
                        .checked_mul(ingredient.cost_per_unit)
                        .map(|cost| currency.format(cost))
                        .unwrap_or_else(|| "-".to_string()),
                    sufficiency_mark(ingredient.current_stock >= line.quantity),
                ),
                None => (
                    format!("#{} (missing)", line.ingredient_id),
                    String::new(),
                    "-".to_string(),
                    "?".to_string(),
                ),
            };
            table.add_row(vec![
                (i + 1).to_string(),
                name,
                format!("{} {}", format_quantity(line.quantity), unit),
                cost,
                sufficient,
            ]);
        }

        table.print();
    }

    println!(
        "  {}: {}",
        "Total cost".bold(),
        currency.format(summary.total_cost)
    );
    println!(
        "  {}: {} ({} portions)",
        "Per portion".bold(),
        currency.format(summary.cost_per_portion),
        draft.yield_portions
    );
    match summary.stock_status {
        DraftStockStatus::Empty => print_info("Add ingredients to check stock"),
        DraftStockStatus::Sufficient => print_success("Enough stock for one batch"),
        DraftStockStatus::Insufficient => print_warning("Insufficient stock for some ingredients"),
    }
}

/// Short low-stock list for the overview, one line per ingredient
pub fn display_low_stock_list(ingredients: &[Ingredient], thresholds: &StockThresholds) {
    for ingredient in ingredients {
        let level = thresholds.level(ingredient.current_stock);
        println!(
            "  {} {} {} {}",
            stock_bar(&level),
            ingredient.name,
            format!("{} {}", format_stock(ingredient.current_stock), ingredient.unit.code())
                .dimmed(),
            tier_label(level.tier)
        );
    }
}

/// Interactive prompts
pub fn prompt_confirm(message: &str, default: bool) -> Result<bool> {
    let result = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(default)
        .interact()
        .map_err(|e| CliError::OperationFailed(e.to_string()))?;

    Ok(result)
}

pub fn prompt_select<T: ToString>(message: &str, items: &[T]) -> Result<usize> {
    let item_strings: Vec<String> = items.iter().map(|item| item.to_string()).collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .items(&item_strings)
        .default(0)
        .interact()
        .map_err(|e| CliError::OperationFailed(e.to_string()))?;

    Ok(selection)
}

pub fn prompt_input(message: &str, default: Option<&str>) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut input = Input::with_theme(&theme).with_prompt(message);

    if let Some(default_val) = default {
        input = input.default(default_val.to_string());
    }

    let result = input
        .allow_empty(default.is_some())
        .interact_text()
        .map_err(|e| CliError::OperationFailed(e.to_string()))?;

    Ok(result)
}

/// Status messages
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_width_ignores_colors() {
        assert_eq!(visible_width("abc"), 3);
        assert_eq!(visible_width("\u{1b}[31mlow\u{1b}[0m"), 3);
        assert_eq!(visible_width("€1.50"), 5);
        assert_eq!(visible_width(""), 0);
    }

    #[test]
    fn test_table_render_aligns_columns() {
        colored::control::set_override(false);

        let mut table = Table::new(vec!["ID".to_string(), "Name".to_string()]);
        table.add_row(vec!["1".to_string(), "Harina".to_string()]);
        table.add_row(vec!["12".to_string(), "Sal".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(table.len(), 2);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "┌────┬────────┐");
        assert_eq!(lines[1], "│ ID │ Name   │");
        assert_eq!(lines[2], "├────┼────────┤");
        assert_eq!(lines[3], "│ 1  │ Harina │");
        assert_eq!(lines[4], "│ 12 │ Sal    │");
        assert_eq!(lines[5], "└────┴────────┘");
    }

    #[test]
    fn test_short_rows_are_padded() {
        colored::control::set_override(false);

        let mut table = Table::new(vec!["A".to_string(), "B".to_string()]);
        table.add_row(vec!["x".to_string()]);

        let rendered = table.render();
        assert!(rendered.contains("│ x │   │"));
    }
}
