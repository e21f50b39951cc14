//! Plugin catalog - the startup registration list of plugin types
//!
//! Plugin directories on disk name a *module*; the catalog maps each module
//! to the factories for the plugin types it provides. Which plugins run stays
//! late-bound (it depends on the directories present), but every plugin type
//! is known at compile time.

use std::collections::BTreeMap;
use std::fmt;

use toolbar_plugin_api::Plugin;

/// Constructs a fresh plugin instance.
pub type PluginFactory = Box<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

/// Registry of plugin factories keyed by module name
#[derive(Default)]
pub struct PluginCatalog {
    modules: BTreeMap<String, Vec<PluginFactory>>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factory to `module`. Factories run in registration order.
    pub fn register<F>(&mut self, module: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        self.modules
            .entry(module.to_string())
            .or_default()
            .push(Box::new(factory));
        self
    }

    /// Add a `Default`-constructible plugin type to `module`
    pub fn register_default<P>(&mut self, module: &str) -> &mut Self
    where
        P: Plugin + Default + 'static,
    {
        self.register(module, || Box::new(P::default()) as Box<dyn Plugin>)
    }

    /// Make `module` known without adding any plugin type to it
    pub fn declare_module(&mut self, module: &str) -> &mut Self {
        self.modules.entry(module.to_string()).or_default();
        self
    }

    /// Factories for `module`; empty when the module is unknown
    pub fn factories(&self, module: &str) -> &[PluginFactory] {
        self.modules.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if `module` has been registered or declared
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Registered module names, sorted
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Move every factory of `other` into this catalog
    pub fn extend(&mut self, other: PluginCatalog) {
        for (module, factories) in other.modules {
            self.modules.entry(module).or_default().extend(factories);
        }
    }
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.modules.iter().map(|(module, f)| (module, f.len())))
            .finish()
    }
}

/// Register plugin types with a [`PluginCatalog`].
///
/// Each plugin type must implement `Default`.
///
/// # Usage
///
/// ```ignore
/// let mut catalog = PluginCatalog::new();
/// toolbar_core::register_plugins!(catalog,
///     "example" => [ExamplePlugin],
///     "speech" => [VoicePlugin, TtsPlugin],
/// );
/// ```
#[macro_export]
macro_rules! register_plugins {
    ($catalog:expr, $($module:literal => [$($plugin:ty),* $(,)?]),* $(,)?) => {{
        let catalog: &mut $crate::PluginCatalog = &mut $catalog;
        $({
            let module: &str = $module;
            catalog.declare_module(module);
            $( catalog.register_default::<$plugin>(module); )*
        })*
    }};
}
