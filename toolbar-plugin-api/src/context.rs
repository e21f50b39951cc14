//! PluginContext - Plugin's interface to the toolbar host

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::PluginError;

/// Root key under which each plugin gets its own settings namespace.
pub const PLUGIN_SETTINGS_ROOT: &str = "plugin_settings";

/// Plugin's interface to the toolbar host.
///
/// Passed to [`crate::Plugin::initialize`] and provides access to:
/// - the plugin's source directory
/// - static settings from the `[settings]` table of `plugin.toml`
/// - the shared configuration document, plus a namespaced view of it
/// - logging tagged with the plugin name
///
/// The shared [`Config`] is reference counted; plugins that need it after
/// `initialize` (for example from a worker thread) clone the `Arc`.
pub struct PluginContext {
    plugin_name: String,
    plugin_dir: PathBuf,
    settings: toml::Table,
    config: Arc<Config>,
}

impl PluginContext {
    /// Create a new plugin context
    pub fn new(plugin_name: String, plugin_dir: PathBuf, config: Arc<Config>) -> Self {
        Self {
            plugin_name,
            plugin_dir,
            settings: toml::Table::new(),
            config,
        }
    }

    /// Builder: attach the manifest's `[settings]` table
    pub fn with_settings(mut self, settings: toml::Table) -> Self {
        self.settings = settings;
        self
    }

    /// Get the plugin's directory
    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Get the plugin's name
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    // ─── Manifest settings ───────────────────────────────────────────

    /// Read a value from the manifest's `[settings]` table
    ///
    /// # Example
    /// ```ignore
    /// let greeting: Option<String> = ctx.setting("greeting");
    /// ```
    pub fn setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.settings
            .get(key)
            .and_then(|value| value.clone().try_into().ok())
    }

    /// The whole `[settings]` table
    pub fn settings(&self) -> &toml::Table {
        &self.settings
    }

    // ─── Shared configuration ────────────────────────────────────────

    /// The shared configuration document
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Dot-path prefix of this plugin's settings namespace
    pub fn namespace(&self) -> String {
        format!("{}.{}", PLUGIN_SETTINGS_ROOT, self.plugin_name)
    }

    /// Read a value from this plugin's namespace
    pub fn config_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config.get(&format!("{}.{}", self.namespace(), key))
    }

    /// Write and persist a value in this plugin's namespace
    ///
    /// # Example
    /// ```ignore
    /// ctx.config_set("last_opened", "2024-01-01")?;
    /// ```
    pub fn config_set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), PluginError> {
        self.config
            .set(&format!("{}.{}", self.namespace(), key), value)?;
        self.config.save()?;
        Ok(())
    }

    // ─── Logging ─────────────────────────────────────────────────────

    /// Log an info message (automatically tagged with the plugin name)
    pub fn log_info(&self, message: &str) {
        tracing::info!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log a warning message
    pub fn log_warn(&self, message: &str) {
        tracing::warn!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log an error message
    pub fn log_error(&self, message: &str) {
        tracing::error!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log a debug message
    pub fn log_debug(&self, message: &str) {
        tracing::debug!(plugin = %self.plugin_name, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(name: &str) -> PluginContext {
        PluginContext::new(
            name.to_string(),
            PathBuf::from("/tmp/test"),
            Arc::new(Config::in_memory()),
        )
    }

    #[test]
    fn test_context_creation() {
        let ctx = context("test");
        assert_eq!(ctx.plugin_name(), "test");
        assert_eq!(ctx.plugin_dir(), Path::new("/tmp/test"));
        assert!(ctx.settings().is_empty());
    }

    #[test]
    fn test_manifest_settings() {
        let settings: toml::Table = toml::from_str(
            r#"
greeting = "hello"
retries = 3
"#,
        )
        .unwrap();
        let ctx = context("test").with_settings(settings);

        assert_eq!(ctx.setting::<String>("greeting"), Some("hello".into()));
        assert_eq!(ctx.setting::<u32>("retries"), Some(3));
        assert_eq!(ctx.setting::<u32>("greeting"), None);
        assert_eq!(ctx.setting::<String>("missing"), None);
    }

    #[test]
    fn test_namespaced_config() {
        let mut ctx = context("voice");
        assert_eq!(ctx.namespace(), "plugin_settings.voice");

        ctx.config_set("language", "en-US").unwrap();
        assert_eq!(ctx.config_get::<String>("language"), Some("en-US".into()));
        assert_eq!(
            ctx.config().get::<String>("plugin_settings.voice.language"),
            Some("en-US".into())
        );
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let config = Arc::new(Config::in_memory());
        let mut a = PluginContext::new("a".into(), PathBuf::from("/a"), config.clone());
        let b = PluginContext::new("b".into(), PathBuf::from("/b"), config);

        a.config_set("count", 1).unwrap();
        assert_eq!(a.config_get::<u32>("count"), Some(1));
        assert_eq!(b.config_get::<u32>("count"), None);
    }

    #[test]
    fn test_config_set_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = Arc::new(Config::load(&path).unwrap());
        let mut ctx = PluginContext::new("example".into(), dir.path().to_path_buf(), config);

        ctx.config_set("activations", 2).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(
            reloaded.get::<u32>("plugin_settings.example.activations"),
            Some(2)
        );
    }
}
