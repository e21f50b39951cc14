//! Plugin system for toolbar
//!
//! This module provides the infrastructure for finding and running plugins:
//!
//! - [`PluginCatalog`]: Startup list of plugin types, keyed by module name
//! - [`PluginRegistry`]: Discovers plugin directories, runs the lifecycle,
//!   and tracks active, failed and disabled plugins
//! - [`PluginInstance`]: One live plugin and its [`PluginState`]
//!
//! # Plugin Discovery
//!
//! Plugins are discovered from two directories, in order:
//! 1. Built-in plugins: `<exe dir>/plugins/` (or `$TOOLBAR_BUILTIN_PLUGIN_DIR`)
//! 2. User plugins: `~/.config/toolbar/plugins/`
//!
//! A user plugin with the same name as a built-in one replaces it.
//!
//! # Plugin Structure
//!
//! Each plugin directory must contain a `plugin.toml`:
//!
//! ```toml
//! # Catalog module to load; defaults to the directory name
//! module = "example"
//!
//! # Handed to the plugin through PluginContext::setting
//! [settings]
//! greeting = "hi"
//! ```
//!
//! # Example
//!
//! ```ignore
//! use toolbar_core::plugins::{PluginCatalog, PluginRegistry, RegistryConfig};
//!
//! let mut catalog = PluginCatalog::new();
//! toolbar_core::register_plugins!(catalog, "example" => [ExamplePlugin]);
//!
//! let mut registry = PluginRegistry::new(RegistryConfig::default(), catalog, config);
//! registry.load_plugins();
//!
//! for (name, instance) in registry.all_plugins() {
//!     let widget = instance.widget();
//! }
//!
//! registry.disable_plugin("example")?;
//! ```

mod catalog;
mod discovery;
mod error;
mod instance;
mod registry;

pub use catalog::{PluginCatalog, PluginFactory};
pub use discovery::{Candidate, Scanned, is_reserved_name, scan_directory};
pub use error::{PluginFailure, RegistryError};
pub use instance::{PluginInstance, PluginState};
pub use registry::{BUILTIN_DIR_KEY, PluginRegistry, RegistryConfig, USER_DIR_KEY};
