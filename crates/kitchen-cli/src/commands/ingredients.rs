use crate::{
    config::Config,
    display::{
        display_ingredient_details, display_ingredients_table, print_info, print_success,
        print_warning, prompt_input,
    },
    IngredientCommands, Result,
};
use clap::Args;
use kitchen_core::parsing::{parse_amount, parse_unit};
use kitchen_core::{IngredientInput, IngredientQuery, IngredientSort, Unit};
use kitchen_utils::format_stock;
use log::debug;

use super::kitchen_from_config;

/// Arguments for `ingredients ls`.
///
/// # Examples
/// ```bash
/// kitchen ingredients ls
/// kitchen ingredients ls --search harina --sort stock
/// kitchen ingredients ls --unit kg
/// kitchen ingredients ls --low        # threshold from config (10 by default)
/// kitchen ingredients ls --low 2.5
/// ```
#[derive(Args)]
pub struct IngredientLsArgs {
    /// Case-insensitive substring of the name
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only ingredients measured in this unit (g, kg, ml, l, u, cup, tbsp, tsp)
    #[arg(short, long)]
    pub unit: Option<Unit>,

    /// Sort order: name, stock (highest first) or cost (cheapest first)
    #[arg(long)]
    pub sort: Option<IngredientSort>,

    /// Only ingredients with stock strictly below THRESHOLD
    #[arg(long, value_name = "THRESHOLD", num_args = 0..=1)]
    pub low: Option<Option<String>>,
}

#[derive(Args)]
pub struct IngredientAddArgs {
    /// Ingredient name
    pub name: String,

    /// Measurement unit code or label
    pub unit: String,

    /// Cost per unit
    pub cost: String,

    /// Initial stock
    #[arg(long, default_value = "0")]
    pub stock: String,
}

#[derive(Args)]
pub struct IngredientEditArgs {
    /// Ingredient id or exact name
    pub ingredient: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub unit: Option<String>,

    #[arg(long)]
    pub cost: Option<String>,

    #[arg(long)]
    pub stock: Option<String>,
}

pub async fn handle(action: IngredientCommands, config: &Config) -> Result<()> {
    match action {
        IngredientCommands::Ls(args) => handle_ls(args, config).await,
        IngredientCommands::Show { ingredient } => handle_show(&ingredient, config).await,
        IngredientCommands::Add(args) => handle_add(args, config).await,
        IngredientCommands::Edit(args) => handle_edit(args, config).await,
        IngredientCommands::Stock { ingredient, amount } => {
            handle_stock(&ingredient, &amount, config).await
        }
    }
}

async fn handle_ls(args: IngredientLsArgs, config: &Config) -> Result<()> {
    let kitchen = kitchen_from_config(config)?;
    let query = IngredientQuery {
        search: args.search,
        unit: args.unit,
        sort: args.sort,
    };

    let ingredients = match args.low {
        Some(raw) => {
            let threshold = match raw {
                Some(value) => parse_amount(&value)?,
                None => config.low_stock_threshold(),
            };
            debug!("Listing ingredients below {}", threshold);
            let low = kitchen.low_stock(threshold).await?;
            if low.is_empty() {
                print_success(&format!("No ingredient is below {}", threshold.normalize()));
                return Ok(());
            }
            print_warning(&format!(
                "{} ingredient(s) below {}",
                low.len(),
                threshold.normalize()
            ));
            query.apply(&low)
        }
        None => kitchen.list_ingredients(&query).await?,
    };

    display_ingredients_table(
        &ingredients,
        kitchen.calculator().thresholds(),
        &config.currency_formatter(),
    );
    Ok(())
}

async fn handle_show(id_or_name: &str, config: &Config) -> Result<()> {
    let kitchen = kitchen_from_config(config)?;
    let ingredient = kitchen.find_ingredient(id_or_name).await?;

    display_ingredient_details(
        &ingredient,
        kitchen.calculator().thresholds(),
        &config.currency_formatter(),
    );
    Ok(())
}

async fn handle_add(args: IngredientAddArgs, config: &Config) -> Result<()> {
    let input = IngredientInput {
        name: args.name.trim().to_string(),
        unit: parse_unit(&args.unit)?,
        cost_per_unit: parse_amount(&args.cost)?,
        current_stock: parse_amount(&args.stock)?,
    };

    let kitchen = kitchen_from_config(config)?;
    let created = kitchen.client().create_ingredient(&input).await?;

    print_success(&format!(
        "Created ingredient '{}' with id {}",
        created.name, created.id
    ));
    Ok(())
}

async fn handle_edit(args: IngredientEditArgs, config: &Config) -> Result<()> {
    let kitchen = kitchen_from_config(config)?;
    let current = kitchen.find_ingredient(&args.ingredient).await?;
    let mut input = IngredientInput::from(&current);

    let interactive = args.name.is_none()
        && args.unit.is_none()
        && args.cost.is_none()
        && args.stock.is_none();

    if interactive {
        print_info("Press enter to keep the current value");
        let name = prompt_input("Name", Some(&input.name))?;
        let unit = prompt_input("Unit", Some(input.unit.code()))?;
        let cost = prompt_input("Cost per unit", Some(&input.cost_per_unit.to_string()))?;
        let stock = prompt_input("Stock", Some(&input.current_stock.to_string()))?;

        input.name = name.trim().to_string();
        input.unit = parse_unit(&unit)?;
        input.cost_per_unit = parse_amount(&cost)?;
        input.current_stock = parse_amount(&stock)?;
    } else {
        if let Some(name) = args.name {
            input.name = name.trim().to_string();
        }
        if let Some(unit) = args.unit {
            input.unit = parse_unit(&unit)?;
        }
        if let Some(cost) = args.cost {
            input.cost_per_unit = parse_amount(&cost)?;
        }
        if let Some(stock) = args.stock {
            input.current_stock = parse_amount(&stock)?;
        }
    }

    if input == IngredientInput::from(&current) {
        print_info("Nothing to update");
        return Ok(());
    }

    let updated = kitchen
        .client()
        .update_ingredient(current.id, &input)
        .await?;
    print_success(&format!("Updated ingredient '{}'", updated.name));
    Ok(())
}

async fn handle_stock(id_or_name: &str, amount: &str, config: &Config) -> Result<()> {
    let new_stock = parse_amount(amount)?;

    let kitchen = kitchen_from_config(config)?;
    let ingredient = kitchen.find_ingredient(id_or_name).await?;
    let updated = kitchen.update_stock(ingredient.id, new_stock).await?;

    let tier = kitchen.calculator().thresholds().tier(updated.current_stock);
    print_success(&format!(
        "Stock of '{}' set to {} {} ({} tier)",
        updated.name,
        format_stock(updated.current_stock),
        updated.unit.code(),
        tier
    ));

    Ok(())
}
