//! Plugin types and metadata structures

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PluginError;

/// File that marks a directory as a plugin package.
pub const MANIFEST_FILE: &str = "plugin.toml";

/// Version reported by plugins that don't override [`crate::Plugin::version`].
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Package manifest (`plugin.toml`) found in every plugin directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Catalog module providing the plugin types (defaults to the directory name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Free-form settings handed to the plugin through its context
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub settings: toml::Table,
}

impl PluginManifest {
    /// Manifest pointing at a catalog module
    pub fn for_module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            settings: toml::Table::new(),
        }
    }

    /// Load a manifest from a `plugin.toml` file
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PluginError::Config(e.to_string()))
    }

    /// Write the manifest, creating the plugin directory if needed
    pub fn save(&self, path: &Path) -> Result<(), PluginError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PluginError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Catalog module to resolve, falling back to the directory name
    pub fn module_or<'a>(&'a self, dir_name: &'a str) -> &'a str {
        self.module.as_deref().unwrap_or(dir_name)
    }
}

/// Identity of a discovered plugin. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Unique name within a registry
    pub name: String,
    /// Semantic version
    pub version: String,
    /// Free text, may be empty
    pub description: String,
    /// Directory the plugin was loaded from
    pub source_path: PathBuf,
}

impl PluginDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        let version = version.into();
        Self {
            name: name.into(),
            version: if version.trim().is_empty() {
                DEFAULT_VERSION.to_string()
            } else {
                version
            },
            description: description.into(),
            source_path: source_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_defaults_module_to_dir_name() {
        let manifest = PluginManifest::default();
        assert_eq!(manifest.module_or("alpha"), "alpha");

        let manifest = PluginManifest::for_module("example");
        assert_eq!(manifest.module_or("alpha"), "example");
    }

    #[test]
    fn test_manifest_parses_settings_table() {
        let manifest: PluginManifest = toml::from_str(
            r#"
module = "example"

[settings]
greeting = "hi"
interval = 5
"#,
        )
        .unwrap();

        assert_eq!(manifest.module.as_deref(), Some("example"));
        assert_eq!(
            manifest.settings.get("greeting").and_then(|v| v.as_str()),
            Some("hi")
        );
        assert_eq!(
            manifest.settings.get("interval").and_then(|v| v.as_integer()),
            Some(5)
        );
    }

    #[test]
    fn test_empty_manifest_is_valid() {
        let manifest: PluginManifest = toml::from_str("").unwrap();
        assert_eq!(manifest, PluginManifest::default());
    }

    #[test]
    fn test_manifest_save_creates_plugin_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scripts").join(MANIFEST_FILE);

        PluginManifest::for_module("scripts").save(&path).unwrap();

        let loaded = PluginManifest::load(&path).unwrap();
        assert_eq!(loaded.module.as_deref(), Some("scripts"));
        assert!(loaded.settings.is_empty());
    }

    #[test]
    fn test_manifest_load_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "module = [unterminated").unwrap();

        let err = PluginManifest::load(&path).unwrap_err();
        assert!(matches!(err, PluginError::Config(_)));
    }

    #[test]
    fn test_descriptor_defaults_empty_version() {
        let descriptor = PluginDescriptor::new("alpha", "", "", "/plugins/alpha");
        assert_eq!(descriptor.version, DEFAULT_VERSION);
        assert!(descriptor.description.is_empty());
        assert_eq!(descriptor.source_path, PathBuf::from("/plugins/alpha"));

        let descriptor = PluginDescriptor::new("beta", "2.1.0", "Beta", "/plugins/beta");
        assert_eq!(descriptor.version, "2.1.0");
    }
}
