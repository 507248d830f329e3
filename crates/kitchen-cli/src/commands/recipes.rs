use crate::{
    config::Config,
    display::{
        display_cost_breakdown, display_recipe_header, display_recipes_table,
        display_scaled_recipe, display_server_breakdown, display_server_scaled, print_info,
        print_warning,
    },
    RecipeCommands, Result,
};
use clap::Args;
use kitchen_core::parsing::parse_scale_factor;
use kitchen_core::{CostBand, Decimal, RecipeQuery, RecipeSort};
use kitchen_utils::Formatter;
use log::debug;

use super::kitchen_from_config;

/// Arguments for `recipes ls`.
///
/// # Examples
/// ```bash
/// kitchen recipes ls
/// kitchen recipes ls --cost low --sort cost
/// kitchen recipes ls --producible --search pan
/// ```
#[derive(Args)]
pub struct RecipeLsArgs {
    /// Case-insensitive substring of the name or description
    #[arg(short, long)]
    pub search: Option<String>,

    /// Cost per portion band: low (< 2), medium (2 to 5), high (> 5)
    #[arg(long)]
    pub cost: Option<CostBand>,

    /// Sort order: name, cost or portions
    #[arg(long)]
    pub sort: Option<RecipeSort>,

    /// Only recipes the current stock can produce
    #[arg(long)]
    pub producible: bool,
}

pub async fn handle(action: RecipeCommands, config: &Config) -> Result<()> {
    match action {
        RecipeCommands::Ls(args) => handle_ls(args, config).await,
        RecipeCommands::Show { id, server } => handle_show(id, server, config).await,
        RecipeCommands::Scale { id, factor, server } => {
            handle_scale(id, &factor, server, config).await
        }
        RecipeCommands::Create(args) => super::create::handle(args, config).await,
    }
}

async fn handle_ls(args: RecipeLsArgs, config: &Config) -> Result<()> {
    let kitchen = kitchen_from_config(config)?;
    let query = RecipeQuery {
        search: args.search,
        cost_band: args.cost,
        sort: args.sort,
        producible_only: args.producible,
    };

    let recipes = kitchen.list_recipes(&query).await?;
    display_recipes_table(&recipes, &config.currency_formatter());
    Ok(())
}

async fn handle_show(id: i64, server: bool, config: &Config) -> Result<()> {
    let kitchen = kitchen_from_config(config)?;
    let currency = config.currency_formatter();

    if server {
        let (recipe, breakdown) = tokio::try_join!(
            kitchen.client().get_recipe(id),
            kitchen.client().get_cost_breakdown(id)
        )?;
        display_recipe_header(&recipe);
        display_server_breakdown(&breakdown, &currency);
        return Ok(());
    }

    let costing = kitchen.recipe_costing(id).await?;
    display_recipe_header(&costing.recipe);
    display_cost_breakdown(&costing.breakdown, &currency);

    // The listing figures come from the server; flag when they disagree.
    if differs_from_server(costing.recipe.batch_cost, costing.breakdown.total_cost) {
        debug!(
            "Server batch cost {} differs from local {}",
            costing.recipe.batch_cost, costing.breakdown.total_cost
        );
        print_info(&format!(
            "Server reports a batch cost of {}",
            currency.format(costing.recipe.batch_cost)
        ));
    }
    Ok(())
}

async fn handle_scale(id: i64, factor: &str, server: bool, config: &Config) -> Result<()> {
    let factor = parse_scale_factor(factor)?;
    let kitchen = kitchen_from_config(config)?;
    let currency = config.currency_formatter();

    if server {
        let scaled = kitchen.client().scale_recipe(id, factor).await?;
        display_server_scaled(&scaled, &currency);
        return Ok(());
    }

    let scaling = kitchen.scale_recipe_locally(id, factor).await?;
    display_scaled_recipe(&scaling.recipe.recipe.name, &scaling.scaled, &currency);

    let short = scaling
        .scaled
        .lines
        .iter()
        .filter(|line| !line.is_sufficient())
        .count();
    if short > 0 {
        print_warning(&format!(
            "{} ingredient(s) lack stock for the scaled batch",
            short
        ));
    }
    Ok(())
}

/// The server sends money with two decimals, rounded half to even.
fn differs_from_server(server: Decimal, local: Decimal) -> bool {
    server != local.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_server_cost_compared_at_two_decimals() {
        // 0.125 × 1.33
        assert!(!differs_from_server(d("0.17"), d("0.16625")));
        assert!(!differs_from_server(d("6.00"), d("6")));
        assert!(differs_from_server(d("6.00"), d("6.25")));
    }
}
