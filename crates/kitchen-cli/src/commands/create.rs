use crate::{
    config::Config,
    display::{
        display_draft, print_info, print_success, print_warning, prompt_confirm, prompt_input,
        prompt_select,
    },
    CliError, Result,
};
use clap::Args;
use kitchen_core::parsing::{
    parse_index, parse_line_item_spec, parse_preparation_time, parse_quantity,
    parse_yield_portions,
};
use kitchen_core::{DraftStockStatus, IngredientCatalog, RecipeDraft};
use kitchen_utils::{format_stock, CurrencyFormatter, Formatter};
use log::debug;

use super::kitchen_from_config;

/// Arguments for `recipes create`.
///
/// Without `--ingredient` the recipe is built interactively.
///
/// # Examples
/// ```bash
/// kitchen recipes create --name "Pan de campo" --yield 12
/// kitchen recipes create --name Bizcochuelo --yield 8 --ingredient 1=0.5 --ingredient 4=6 -y
/// ```
#[derive(Args)]
pub struct RecipeCreateArgs {
    /// Recipe name (prompted when missing)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Portions produced by one batch (prompted when missing)
    #[arg(long = "yield", value_name = "PORTIONS")]
    pub yield_portions: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Preparation time in minutes
    #[arg(long)]
    pub prep_time: Option<String>,

    /// Ingredient line as ID=QUANTITY, may be repeated
    #[arg(short, long, value_name = "ID=QTY")]
    pub ingredient: Vec<String>,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

const ADD_CHOICE: &str = "Add ingredient";
const REMOVE_CHOICE: &str = "Remove ingredient";
const YIELD_CHOICE: &str = "Change yield";
const DONE_CHOICE: &str = "Done";

pub async fn handle(args: RecipeCreateArgs, config: &Config) -> Result<()> {
    let kitchen = kitchen_from_config(config)?;
    let currency = config.currency_formatter();
    let catalog = kitchen.catalog().await?;

    if catalog.is_empty() {
        return Err(CliError::InvalidInput(
            "There are no ingredients yet; add some with `kitchen ingredients add`".to_string(),
        ));
    }

    let interactive = args.ingredient.is_empty();
    let mut draft = draft_from_args(&args)?;

    if interactive {
        build_interactively(&mut draft, &catalog, &currency)?;
    }

    draft.to_request()?;
    let summary = draft.summary(&catalog)?;
    display_draft(&draft, &catalog, &summary, &currency);

    if summary.stock_status == DraftStockStatus::Insufficient {
        print_warning("The recipe can be saved, but current stock cannot produce a batch");
    }

    if !args.yes && !prompt_confirm(&format!("Create recipe '{}'?", draft.name), true)? {
        print_info("Cancelled");
        return Ok(());
    }

    let created = kitchen.create_recipe(&draft).await?;
    print_success(&format!(
        "Created recipe '{}' with id {} ({} per portion)",
        created.recipe.name,
        created
            .recipe
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".to_string()),
        currency.format(created.cost_per_portion)
    ));
    Ok(())
}

/// Fill a draft from flags, prompting for the name and yield when they are missing.
fn draft_from_args(args: &RecipeCreateArgs) -> Result<RecipeDraft> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => prompt_input("Recipe name", None)?,
    };
    let yield_raw = match &args.yield_portions {
        Some(raw) => raw.clone(),
        None => prompt_input("Portions per batch", Some("1"))?,
    };

    let mut draft = RecipeDraft::new(name.trim(), 1);
    draft.set_yield(parse_yield_portions(&yield_raw)?)?;
    draft.description = args.description.clone().unwrap_or_default();
    if let Some(raw) = &args.prep_time {
        draft.preparation_time = parse_preparation_time(raw)?;
    }

    for spec in &args.ingredient {
        let line = parse_line_item_spec(spec)?;
        draft.add_line(line.ingredient_id, line.quantity)?;
    }

    Ok(draft)
}

fn build_interactively(
    draft: &mut RecipeDraft,
    catalog: &IngredientCatalog,
    currency: &CurrencyFormatter,
) -> Result<()> {
    let ingredients = catalog.sorted_by_name();

    loop {
        let summary = draft.summary(catalog)?;
        display_draft(draft, catalog, &summary, currency);

        let mut choices = vec![ADD_CHOICE];
        if !draft.is_empty() {
            choices.push(REMOVE_CHOICE);
        }
        choices.push(YIELD_CHOICE);
        choices.push(DONE_CHOICE);

        match choices[prompt_select("What next?", &choices)?] {
            ADD_CHOICE => {
                let labels: Vec<String> = ingredients
                    .iter()
                    .map(|ingredient| {
                        format!(
                            "{} ({}, {} in stock)",
                            ingredient.name,
                            currency.format(ingredient.cost_per_unit),
                            format_stock(ingredient.current_stock)
                        )
                    })
                    .collect();
                let picked = ingredients[prompt_select("Ingredient", &labels)?];

                let raw = prompt_input(&format!("Quantity ({})", picked.unit.code()), None)?;
                match parse_quantity(&raw) {
                    Ok(quantity) => {
                        debug!("Draft line {} = {}", picked.id, quantity);
                        draft.add_line(picked.id, quantity)?;
                    }
                    Err(e) => print_warning(&e.to_string()),
                }
            }
            REMOVE_CHOICE => {
                let count = draft.lines().len();
                let raw = prompt_input(&format!("Line to remove (1-{})", count), None)?;
                match parse_index(&raw, count) {
                    Ok(index) => {
                        draft.remove_line(index)?;
                    }
                    Err(e) => print_warning(&e.to_string()),
                }
            }
            YIELD_CHOICE => {
                let raw = prompt_input(
                    "Portions per batch",
                    Some(&draft.yield_portions.to_string()),
                )?;
                if let Err(e) = parse_yield_portions(&raw).and_then(|y| draft.set_yield(y)) {
                    print_warning(&e.to_string());
                }
            }
            _ => {
                if draft.is_empty() {
                    print_warning("A recipe needs at least one ingredient");
                    continue;
                }
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(ingredient: &[&str]) -> RecipeCreateArgs {
        RecipeCreateArgs {
            name: Some(" Pan ".to_string()),
            yield_portions: Some("12".to_string()),
            description: Some("Pan de campo".to_string()),
            prep_time: Some("90".to_string()),
            ingredient: ingredient.iter().map(|s| s.to_string()).collect(),
            yes: true,
        }
    }

    #[test]
    fn test_draft_from_flags() {
        let draft = draft_from_args(&args(&["1=0.5", "2=3"])).unwrap();

        assert_eq!(draft.name, "Pan");
        assert_eq!(draft.yield_portions, 12);
        assert_eq!(draft.preparation_time, Some(90));
        assert_eq!(draft.lines().len(), 2);
        assert_eq!(draft.lines()[0].ingredient_id, 1);
    }

    #[test]
    fn test_repeated_ingredient_replaces_quantity() {
        let draft = draft_from_args(&args(&["1=0.5", "1=2"])).unwrap();

        assert_eq!(draft.lines().len(), 1);
        assert_eq!(draft.lines()[0].quantity.to_string(), "2");
    }

    #[test]
    fn test_bad_flags_are_rejected() {
        assert!(draft_from_args(&args(&["1=0"])).is_err());
        assert!(draft_from_args(&args(&["flour"])).is_err());

        let mut zero_yield = args(&["1=1"]);
        zero_yield.yield_portions = Some("0".to_string());
        assert!(draft_from_args(&zero_yield).is_err());
    }
}
