//! Plugin management commands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use toolbar_core::{PluginRegistry, PluginState, RegistryConfig};
use toolbar_plugin_api::{Config, MANIFEST_FILE, PluginManifest};

/// Plugin management arguments
#[derive(Args)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginCommands,
}

/// Plugin subcommands
#[derive(Subcommand)]
pub enum PluginCommands {
    /// List active plugins
    List {
        /// Include failed and disabled plugins
        #[arg(long)]
        all: bool,
    },
    /// Enable a plugin
    Enable {
        /// Plugin name to enable
        name: String,
    },
    /// Disable a plugin
    Disable {
        /// Plugin name to disable
        name: String,
    },
    /// Show plugin details
    Info {
        /// Plugin name
        name: String,
    },
    /// Reload a plugin (development)
    Reload {
        /// Plugin name to reload
        name: String,
    },
    /// List plugins that failed to load, with the reason
    Failed,
    /// Create a user plugin directory for a catalog module
    Install {
        /// Catalog module the plugin directory should load
        module: String,
        /// Directory name (defaults to the module name)
        #[arg(long)]
        name: Option<String>,
    },
}

/// Run plugin command
pub fn run(args: PluginArgs, config: Arc<Config>) -> Result<()> {
    let mut registry = super::build_registry(config);

    match args.command {
        PluginCommands::List { all } => list_plugins(&mut registry, all),
        PluginCommands::Enable { name } => enable_plugin(&mut registry, &name),
        PluginCommands::Disable { name } => disable_plugin(&mut registry, &name),
        PluginCommands::Info { name } => show_plugin_info(&mut registry, &name),
        PluginCommands::Reload { name } => reload_plugin(&mut registry, &name),
        PluginCommands::Failed => show_failed(&mut registry),
        PluginCommands::Install { module, name } => {
            let user_dir = RegistryConfig::from_config(registry.config()).user_plugin_dir;
            let known = registry.catalog().contains(&module);
            let path = install_plugin(&user_dir, &module, name.as_deref())?;
            println!("Installed plugin package: {}", path.display());
            if !known {
                println!();
                println!("Warning: module '{}' is not compiled into this toolbar;", module);
                println!("the plugin will be reported as failed until it is.");
            }
            Ok(())
        }
    }
}

/// One row of `plugin list`
#[derive(Debug, Clone, PartialEq)]
pub struct PluginRow {
    pub name: String,
    pub version: String,
    pub state: String,
    pub description: String,
}

/// Rows for `plugin list`, sorted by name. Without `all`, only active plugins.
pub fn plugin_rows(registry: &PluginRegistry, all: bool) -> Vec<PluginRow> {
    registry
        .plugin_states()
        .into_iter()
        .filter(|(_, state)| all || *state == PluginState::Active)
        .map(|(name, state)| {
            let descriptor = registry.descriptor(&name);
            PluginRow {
                version: descriptor
                    .map(|d| d.version.clone())
                    .unwrap_or_else(|| "-".to_string()),
                description: match (&state, descriptor) {
                    (PluginState::Failed { error }, _) => error.clone(),
                    (_, Some(d)) if !d.description.is_empty() => d.description.clone(),
                    _ => "No description".to_string(),
                },
                state: state_label(&state).to_string(),
                name,
            }
        })
        .collect()
}

fn state_label(state: &PluginState) -> &'static str {
    match state {
        PluginState::Active => "✓ active",
        PluginState::Disabled => "○ disabled",
        PluginState::Failed { .. } => "✗ failed",
        PluginState::Uninitialized => "· pending",
    }
}

fn list_plugins(registry: &mut PluginRegistry, all: bool) -> Result<()> {
    registry.load_plugins();
    let rows = plugin_rows(registry, all);

    if rows.is_empty() {
        println!("No plugins active");
        println!();
        for dir in registry.search_dirs() {
            println!("Plugin directory: {}", dir.display());
        }
        println!();
        println!("To install a plugin:");
        println!("  toolbar plugin install example");
        println!();
        println!("Run 'toolbar plugin list --all' to include failed and disabled plugins.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Version").fg(Color::Cyan),
        Cell::new("State").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(&row.version),
            Cell::new(&row.state),
            Cell::new(&row.description),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn enable_plugin(registry: &mut PluginRegistry, name: &str) -> Result<()> {
    registry.enable_plugin(name)?;
    println!("Enabled plugin: {}", name);

    if registry.get_plugin(name).is_some() {
        println!("Plugin '{}' is active.", name);
    } else if let Some(failure) = registry.failure(name) {
        println!("Plugin '{}' failed to load: {}", name, failure);
    } else {
        println!("Run 'toolbar plugin list --all' to verify the plugin loads correctly.");
    }
    Ok(())
}

fn disable_plugin(registry: &mut PluginRegistry, name: &str) -> Result<()> {
    registry.load_plugins();
    registry.disable_plugin(name)?;
    println!("Disabled plugin: {}", name);
    Ok(())
}

fn show_plugin_info(registry: &mut PluginRegistry, name: &str) -> Result<()> {
    registry.load_plugins();

    if let Some(instance) = registry.get_plugin(name) {
        let d = instance.descriptor();
        println!("Name:        {}", d.name);
        println!("Version:     {}", d.version);
        println!(
            "Description: {}",
            if d.description.is_empty() {
                "No description"
            } else {
                &d.description
            }
        );
        println!("Source:      {}", d.source_path.display());
        println!();
        println!("Status:      Active");

        if let Some(widget) = instance.widget() {
            println!();
            println!("Widget:");
            for line in widget.render().lines() {
                println!("  {}", line);
            }
        }
        return Ok(());
    }

    match registry.plugin_states().get(name) {
        Some(PluginState::Failed { error }) => {
            println!("Name:        {}", name);
            println!("Status:      Failed ({})", error);
        }
        Some(PluginState::Disabled) => {
            println!("Name:        {}", name);
            println!("Status:      Disabled");
            println!();
            println!("Run 'toolbar plugin enable {}' to turn it back on.", name);
        }
        _ => {
            println!("Plugin '{}' not found", name);
            println!();
            println!("The plugin might not be installed or enabled.");
            println!("Run 'toolbar plugin list --all' to see all plugins.");
        }
    }

    Ok(())
}

fn reload_plugin(registry: &mut PluginRegistry, name: &str) -> Result<()> {
    registry.load_plugins();
    println!("Reloading plugin: {}", name);
    registry.reload_plugin(name)?;

    match registry.failure(name) {
        Some(failure) => println!("Plugin '{}' failed to reload: {}", name, failure),
        None => println!("Plugin '{}' reloaded", name),
    }
    Ok(())
}

fn show_failed(registry: &mut PluginRegistry) -> Result<()> {
    registry.load_plugins();
    let failed = registry.failed_plugins();

    if failed.is_empty() {
        println!("No failed plugins");
        return Ok(());
    }

    for (name, reason) in failed {
        println!("✗ {}    {}", name, reason);
    }
    Ok(())
}

/// Write `<plugin_dir>/<name>/plugin.toml` pointing at `module`.
///
/// Built-in modules get their shipped manifest, settings included.
pub fn install_plugin(plugin_dir: &Path, module: &str, name: Option<&str>) -> Result<PathBuf> {
    let dir_name = name.unwrap_or(module);
    if dir_name.is_empty() || dir_name.contains(['/', '\\']) || dir_name.starts_with('.') {
        bail!("Invalid plugin directory name '{}'", dir_name);
    }

    let path = plugin_dir.join(dir_name).join(MANIFEST_FILE);
    if path.exists() {
        bail!("Plugin '{}' is already installed at {}", dir_name, path.display());
    }

    let manifest = toolbar_builtins::builtin_manifests()
        .into_iter()
        .find(|(_, manifest)| manifest.module.as_deref() == Some(module))
        .map(|(_, manifest)| manifest)
        .unwrap_or_else(|| PluginManifest::for_module(module));

    manifest.save(&path)?;
    tracing::info!(plugin = %dir_name, module = %module, "Plugin package created");
    Ok(path)
}
