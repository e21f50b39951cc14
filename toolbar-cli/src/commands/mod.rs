//! CLI subcommands

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use toolbar_core::{PluginRegistry, RegistryConfig};
use toolbar_plugin_api::Config;

pub mod config;
pub mod plugin;
pub mod run;

/// Load the configuration from `path`, or the per-user default
pub fn open_config(path: Option<&Path>) -> Result<Arc<Config>> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::open_default().context("Failed to load config")?,
    };
    Ok(Arc::new(config))
}

/// Registry over the built-in catalog, with directories taken from `config`
pub fn build_registry(config: Arc<Config>) -> PluginRegistry {
    PluginRegistry::new(
        RegistryConfig::from_config(&config),
        toolbar_builtins::catalog(),
        config,
    )
}
