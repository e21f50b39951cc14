//! toolbar-core: Plugin discovery and lifecycle for the toolbar
//!
//! This crate turns plugin directories on disk into running plugin objects:
//!
//! - **Catalog** - [`PluginCatalog`] maps the module named by a plugin
//!   directory to the plugin types compiled into the host
//! - **Discovery** - [`plugins::scan_directory`] finds plugin packages in the
//!   built-in and user plugin directories
//! - **Registry** - [`PluginRegistry`] initializes, tracks, disables and
//!   cleans up plugins, isolating every failure to the plugin that caused it
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use toolbar_core::{PluginCatalog, PluginRegistry, RegistryConfig};
//! use toolbar_plugin_api::Config;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::open_default()?);
//!     let mut registry = PluginRegistry::new(
//!         RegistryConfig::from_config(&config),
//!         PluginCatalog::new(),
//!         config,
//!     );
//!
//!     registry.load_plugins();
//!     for (name, reason) in registry.failed_plugins() {
//!         println!("{name}: {reason}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod plugins;

// Re-export key types for convenience
pub use plugins::{
    PluginCatalog, PluginFactory, PluginFailure, PluginInstance, PluginRegistry, PluginState,
    RegistryConfig, RegistryError,
};
