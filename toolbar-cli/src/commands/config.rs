use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde_json::Value;
use toolbar_core::RegistryConfig;
use toolbar_plugin_api::Config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (defaults merged with the file)
    Show,
    /// Show configuration file and plugin directory paths
    Path,
    /// Print one value
    Get {
        /// Dot-separated key, e.g. `ui.opacity`
        key: String,
    },
    /// Set one value and save
    Set {
        /// Dot-separated key, e.g. `ui.opacity`
        key: String,
        /// JSON value; anything that isn't valid JSON is stored as a string
        value: String,
    },
}

pub fn run(args: ConfigArgs, config: Arc<Config>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&config),
        ConfigCommands::Path => show_paths(&config),
        ConfigCommands::Get { key } => get_value(&config, &key),
        ConfigCommands::Set { key, value } => set_value(&config, &key, &value),
    }
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.snapshot())?);
    Ok(())
}

fn show_paths(config: &Config) -> Result<()> {
    let registry_config = RegistryConfig::from_config(config);
    let config_file = config
        .path()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(toolbar_paths::config_file);

    println!("Config file:      {}", config_file.display());
    println!("Built-in plugins: {}", registry_config.builtin_plugin_dir.display());
    println!("User plugins:     {}", registry_config.user_plugin_dir.display());
    Ok(())
}

fn get_value(config: &Config, key: &str) -> Result<()> {
    let Some(value) = config.get_value(key) else {
        bail!("Config key '{}' is not set", key);
    };
    match value {
        Value::String(s) => println!("{}", s),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    Ok(())
}

fn set_value(config: &Config, key: &str, raw: &str) -> Result<()> {
    config.set(key, parse_value(raw))?;
    config.save()?;
    println!("Set {} = {}", key, raw);
    Ok(())
}

/// Interpret a command-line value as JSON, falling back to a plain string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
