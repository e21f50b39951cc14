//! Headless toolbar host
//!
//! Loads every enabled plugin and prints each active plugin's widget as one
//! toolbar entry. Runs until Ctrl-C, then cleans every plugin up.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use toolbar_core::PluginRegistry;
use toolbar_plugin_api::Config;
use tracing::info;

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Render the toolbar once and exit
    #[arg(long)]
    pub once: bool,
}

/// Run the toolbar
pub async fn run(args: RunArgs, config: Arc<Config>) -> Result<()> {
    let mut registry = super::build_registry(config);
    for dir in registry.search_dirs() {
        info!(dir = %dir.display(), "Plugin search directory");
    }

    registry.load_plugins();
    println!("{}", render_toolbar(&registry));

    if !args.once {
        info!("Toolbar running, press Ctrl-C to exit");
        tokio::signal::ctrl_c().await?;
        info!("Shutting down");
    }

    registry.cleanup();
    Ok(())
}

/// Text rendering of the toolbar: one block per active plugin, then the
/// plugins that failed to load.
pub fn render_toolbar(registry: &PluginRegistry) -> String {
    let mut out = String::new();

    if registry.active_count() == 0 {
        out.push_str("No active plugins\n");
    }

    for instance in registry.all_plugins().values() {
        if let Some(widget) = instance.widget() {
            out.push_str(&widget.render());
            out.push('\n');
        }
    }

    let failed = registry.failed_plugins();
    if !failed.is_empty() {
        out.push('\n');
        out.push_str("Failed plugins:\n");
        for (name, reason) in failed {
            out.push_str(&format!("  ✗ {}: {}\n", name, reason));
        }
    }

    out.trim_end().to_string()
}
