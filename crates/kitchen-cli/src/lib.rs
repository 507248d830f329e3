//! # Kitchen CLI
//!
//! Command-line interface for the kitchen inventory and recipe costing service.
//! This crate provides the CLI structure, argument parsing, and command routing.

pub mod commands;
pub mod config;
pub mod display;

pub use config::Config;

use clap::{Parser, Subcommand};
use thiserror::Error;

/// Application-level errors for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] kitchen_core::KitchenError),

    #[error("API error: {0}")]
    Api(#[from] kitchen_api::ApiError),

    #[error("Formatting error: {0}")]
    Utils(#[from] kitchen_utils::UtilsError),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Other(format!("Input error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Main CLI struct
#[derive(Parser)]
#[command(name = "kitchen")]
#[command(about = "Ingredient stock and recipe costing for a small kitchen")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// All available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage ingredients and stock
    #[command(alias = "ing")]
    Ingredients {
        #[command(subcommand)]
        action: IngredientCommands,
    },
    /// Browse, cost, scale and create recipes
    #[command(alias = "rec")]
    Recipes {
        #[command(subcommand)]
        action: RecipeCommands,
    },
    /// Totals, latest recipes and low stock at a glance
    Status,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum IngredientCommands {
    /// List ingredients
    Ls(commands::ingredients::IngredientLsArgs),
    /// Show one ingredient
    Show {
        /// Ingredient id or exact name
        ingredient: String,
    },
    /// Create an ingredient
    Add(commands::ingredients::IngredientAddArgs),
    /// Edit an ingredient (interactive when no field flags are given)
    Edit(commands::ingredients::IngredientEditArgs),
    /// Set the current stock of an ingredient
    Stock {
        /// Ingredient id or exact name
        ingredient: String,
        /// New stock amount
        amount: String,
    },
}

#[derive(Subcommand)]
pub enum RecipeCommands {
    /// List recipes
    Ls(commands::recipes::RecipeLsArgs),
    /// Show a recipe with its cost breakdown
    Show {
        /// Recipe id
        id: i64,
        /// Use the breakdown computed by the server
        #[arg(long)]
        server: bool,
    },
    /// Scale a recipe by a factor
    Scale {
        /// Recipe id
        id: i64,
        /// Multiplier, e.g. 2 or 0.5
        factor: String,
        /// Let the server do the scaling
        #[arg(long)]
        server: bool,
    },
    /// Build and save a new recipe
    Create(commands::create::RecipeCreateArgs),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the configuration file path
    Path,
}

/// Main CLI runner
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::new()?;

    match cli.command {
        Commands::Ingredients { action } => commands::ingredients::handle(action, &config).await,
        Commands::Recipes { action } => commands::recipes::handle(action, &config).await,
        Commands::Status => commands::status::handle(&config).await,
        Commands::Config { action } => commands::config::handle(action, &mut config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use kitchen_core::Unit;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_low_flag_with_and_without_value() {
        let cli = Cli::try_parse_from(["kitchen", "ingredients", "ls", "--low"]).unwrap();
        match cli.command {
            Commands::Ingredients {
                action: IngredientCommands::Ls(args),
            } => assert_eq!(args.low, Some(None)),
            _ => panic!("expected ingredients ls"),
        }

        let cli =
            Cli::try_parse_from(["kitchen", "ing", "ls", "--low", "2.5", "--unit", "kg"]).unwrap();
        match cli.command {
            Commands::Ingredients {
                action: IngredientCommands::Ls(args),
            } => {
                assert_eq!(args.low, Some(Some("2.5".to_string())));
                assert_eq!(args.unit, Some(Unit::Kilograms));
            }
            _ => panic!("expected ingredients ls"),
        }
    }

    #[test]
    fn test_unknown_unit_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["kitchen", "ingredients", "ls", "--unit", "oz"]).is_err());
    }

    #[test]
    fn test_create_collects_repeated_ingredients() {
        let cli = Cli::try_parse_from([
            "kitchen",
            "recipes",
            "create",
            "--name",
            "Pan",
            "--yield",
            "12",
            "-i",
            "1=0.5",
            "-i",
            "3=2",
        ])
        .unwrap();

        match cli.command {
            Commands::Recipes {
                action: RecipeCommands::Create(args),
            } => {
                assert_eq!(args.yield_portions.as_deref(), Some("12"));
                assert_eq!(args.ingredient, vec!["1=0.5", "3=2"]);
                assert!(!args.yes);
            }
            _ => panic!("expected recipes create"),
        }
    }

    #[test]
    fn test_core_errors_surface_their_message() {
        let err: CliError = kitchen_core::KitchenError::invalid("Recipe total is too large").into();
        assert!(matches!(err, CliError::Core(_)));
        assert!(err.to_string().contains("Recipe total is too large"));
    }
}
