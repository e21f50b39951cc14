//! toolbar-plugin-api - Plugin API for the toolbar
//!
//! This crate provides the traits and types needed to write toolbar plugins.
//! A plugin is a plain Rust type implementing [`Plugin`]; the host resolves
//! plugin directories to statically registered factories, initializes each
//! plugin with a [`PluginContext`], and places the [`UiHandle`] it returns
//! on the toolbar.
//!
//! # Example
//!
//! ```ignore
//! use toolbar_plugin_api::{Plugin, PluginContext, PluginError, TextWidget, UiHandle};
//!
//! #[derive(Default)]
//! pub struct ClockPlugin;
//!
//! impl Plugin for ClockPlugin {
//!     fn name(&self) -> String {
//!         "clock".to_string()
//!     }
//!
//!     fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
//!         ctx.log_info("Clock plugin initialized");
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self) -> Result<(), PluginError> {
//!         Ok(())
//!     }
//!
//!     fn create_widget(&self) -> UiHandle {
//!         UiHandle::new(TextWidget::new("Clock").with_icon("clock"))
//!     }
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod types;
pub mod widget;

pub use config::{Config, ConfigError, DISABLED_PLUGINS_KEY};
pub use context::PluginContext;
pub use error::PluginError;
pub use types::*;
pub use widget::{DEFAULT_ICON, TextWidget, UiHandle, Widget};

/// The core plugin trait - implement this to create a toolbar plugin.
///
/// Identity accessors have defaults, so a minimal plugin only provides the
/// lifecycle hooks and its widget.
pub trait Plugin: Send {
    /// Unique plugin name. Defaults to the implementing type's name.
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    /// Plugin version (semver)
    fn version(&self) -> String {
        DEFAULT_VERSION.to_string()
    }

    /// Human-readable description
    fn description(&self) -> String {
        String::new()
    }

    /// Called once after construction. Use this to read settings and acquire
    /// resources; returning an error marks the plugin as failed.
    fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError>;

    /// Release everything acquired since construction.
    ///
    /// May be called after a partially failed `initialize`, and more than
    /// once, so it must be idempotent.
    fn cleanup(&mut self) -> Result<(), PluginError>;

    /// Build the plugin's toolbar widget.
    ///
    /// The host calls this at most once per instance and caches the result.
    fn create_widget(&self) -> UiHandle;
}

/// Strip the module path from a type name (`a::b::Foo<x::Y>` -> `Foo<x::Y>`).
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct BareTestPlugin;

    impl Plugin for BareTestPlugin {
        fn initialize(&mut self, _ctx: &mut PluginContext) -> Result<(), PluginError> {
            Ok(())
        }

        fn cleanup(&mut self) -> Result<(), PluginError> {
            Ok(())
        }

        fn create_widget(&self) -> UiHandle {
            UiHandle::new(TextWidget::new("bare"))
        }
    }

    #[test]
    fn test_plugin_trait_is_object_safe() {
        // This compiles only if Plugin is object-safe
        fn _takes_boxed_plugin(_: Box<dyn Plugin>) {}
    }

    #[test]
    fn test_name_defaults_to_type_name() {
        let plugin = BareTestPlugin;
        assert_eq!(plugin.name(), "BareTestPlugin");

        let boxed: Box<dyn Plugin> = Box::new(BareTestPlugin);
        assert_eq!(boxed.name(), "BareTestPlugin");
    }

    #[test]
    fn test_identity_defaults() {
        let plugin = BareTestPlugin;
        assert_eq!(plugin.version(), "1.0.0");
        assert!(plugin.description().is_empty());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("Foo"), "Foo");
        assert_eq!(short_type_name("a::b::Foo"), "Foo");
        assert_eq!(short_type_name("a::Foo<b::Bar>"), "Foo<b::Bar>");
    }
}
