pub mod config;
pub mod create;
pub mod ingredients;
pub mod recipes;
pub mod status;

use crate::{config::Config, Result};
use kitchen_api::{Kitchen, KitchenApiClient};
use log::debug;

/// Build the SDK from the user's configuration.
pub fn kitchen_from_config(config: &Config) -> Result<Kitchen> {
    let client = KitchenApiClient::from_config(config)?;
    debug!("Using API at {}", client.base_url());
    Ok(Kitchen::with_calculator(client, config.calculator()?))
}
