use anyhow::Result;
use colored::Colorize;

use deckbuilder::config::Config;

use crate::cli::ConfigCommands;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = if path.exists() {
        Config::load_from(&path)?
    } else {
        println!("{}", "No config file yet; showing defaults.".dimmed());
        Config::default()
    };
    println!("{} {}", "Config file:".bold(), path.display());
    print!("{}", serde_yaml::to_string(&config.effective())?);
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
