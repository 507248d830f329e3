use crate::{
    config::{Config, CONFIG_KEYS},
    display::{print_info, print_success, prompt_confirm},
    ConfigCommands, Result,
};
use colored::Colorize;
use log::debug;

/// Handles the `config` command.
///
/// `set` and `reset` write the file immediately; values are validated before
/// anything is saved.
///
/// # Examples
/// ```bash
/// kitchen config show
/// kitchen config set api.base_url http://192.168.1.20:8000/api/
/// kitchen config set stock.low 2.5
/// kitchen config get display.currency_symbol
/// kitchen config reset --yes
/// ```
pub async fn handle(action: ConfigCommands, config: &mut Config) -> Result<()> {
    match action {
        ConfigCommands::Show => handle_show(config),
        ConfigCommands::Get { key } => handle_get(&key, config),
        ConfigCommands::Set { key, value } => handle_set(&key, &value, config),
        ConfigCommands::Reset { yes } => handle_reset(yes, config),
        ConfigCommands::Path => {
            println!("{}", config.path().display());
            Ok(())
        }
    }
}

fn handle_show(config: &Config) -> Result<()> {
    println!("{}", "Current configuration".bold().blue());
    println!("  {}: {}", "File".bold(), config.path().display());
    println!("  {}: {}", "Effective API".bold(), config.base_url());
    println!("  {}: {}s", "Timeout".bold(), config.timeout().as_secs());
    println!();

    let stored = config.show_config();
    if stored.trim().is_empty() {
        print_info("Nothing stored yet, defaults are in use");
    } else {
        println!("{}", stored);
    }
    Ok(())
}

fn handle_get(key: &str, config: &Config) -> Result<()> {
    match config.get(key)? {
        Some(value) => println!("{}", value),
        None => print_info(&format!("{} is not set", key)),
    }
    Ok(())
}

fn handle_set(key: &str, value: &str, config: &mut Config) -> Result<()> {
    config.set(key, value)?;
    config.save()?;
    debug!("Saved {} to {}", key, config.path().display());

    print_success(&format!("{} = {}", key, value.trim()));
    Ok(())
}

fn handle_reset(yes: bool, config: &mut Config) -> Result<()> {
    if !yes && !prompt_confirm("Reset every setting to its default?", false)? {
        print_info("Cancelled");
        return Ok(());
    }

    config.reset();
    config.save()?;
    print_success(&format!(
        "Configuration reset ({} keys back to defaults)",
        CONFIG_KEYS.len()
    ));
    Ok(())
}
