//! Built-in plugins shipped with the toolbar
//!
//! The plugin types live here; which of them run is still decided by the
//! plugin directories on disk. [`catalog`] registers every type under its
//! module name and [`install_builtins`] writes the matching `plugin.toml`
//! packages into a plugin directory.
//!
//! ## Installing
//!
//! ```bash
//! toolbar plugin install example
//! toolbar plugin install scripts
//! ```

use std::path::{Path, PathBuf};

use toolbar_core::PluginCatalog;
use toolbar_plugin_api::{MANIFEST_FILE, PluginError, PluginManifest};

pub mod example;
pub mod scripts;

pub use example::ExamplePlugin;
pub use scripts::{ScriptEntry, ScriptsPlugin};

/// Catalog containing every built-in plugin type
pub fn catalog() -> PluginCatalog {
    let mut catalog = PluginCatalog::new();
    toolbar_core::register_plugins!(catalog,
        "example" => [ExamplePlugin],
        "scripts" => [ScriptsPlugin],
    );
    catalog
}

/// Package directory name and manifest for each built-in plugin
pub fn builtin_manifests() -> Vec<(&'static str, PluginManifest)> {
    let mut example = PluginManifest::for_module("example");
    example.settings.insert(
        "greeting".into(),
        example::DEFAULT_GREETING.to_string().into(),
    );

    vec![
        ("example", example),
        ("scripts", PluginManifest::for_module("scripts")),
    ]
}

/// Write a package for every built-in plugin into `plugin_dir`.
///
/// Existing manifests are left alone so local edits survive. Returns the
/// manifests that were written.
pub fn install_builtins(plugin_dir: &Path) -> Result<Vec<PathBuf>, PluginError> {
    let mut written = Vec::new();
    for (dir_name, manifest) in builtin_manifests() {
        let path = plugin_dir.join(dir_name).join(MANIFEST_FILE);
        if path.exists() {
            tracing::debug!(plugin = %dir_name, "Built-in plugin already installed");
            continue;
        }
        manifest.save(&path)?;
        tracing::info!(plugin = %dir_name, path = %path.display(), "Installed built-in plugin");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_catalog_has_every_manifest_module() {
        let catalog = catalog();
        for (_, manifest) in builtin_manifests() {
            let module = manifest.module.unwrap();
            assert_eq!(catalog.factories(&module).len(), 1, "module {module}");
        }
    }

    #[test]
    fn test_catalog_plugin_names() {
        let catalog = catalog();
        assert_eq!(catalog.factories("example")[0]().name(), "example");
        assert_eq!(catalog.factories("scripts")[0]().name(), "scripts");
    }

    #[test]
    fn test_install_builtins_writes_manifests() {
        let dir = TempDir::new().unwrap();

        let written = install_builtins(dir.path()).unwrap();
        assert_eq!(written.len(), 2);

        let manifest =
            PluginManifest::load(&dir.path().join("example").join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.module.as_deref(), Some("example"));
        assert_eq!(
            manifest.settings.get("greeting").and_then(|v| v.as_str()),
            Some(example::DEFAULT_GREETING)
        );
    }

    #[test]
    fn test_install_builtins_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("example").join(MANIFEST_FILE);
        std::fs::create_dir_all(custom.parent().unwrap()).unwrap();
        std::fs::write(&custom, "module = \"example\"\n[settings]\ngreeting = \"hey\"\n").unwrap();

        let written = install_builtins(dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("scripts").join(MANIFEST_FILE)]);
        assert!(std::fs::read_to_string(&custom).unwrap().contains("hey"));
    }
}
