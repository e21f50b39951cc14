//! Built-in plugins loaded through a real registry

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use toolbar_builtins::{catalog, install_builtins};
use toolbar_core::{PluginRegistry, RegistryConfig};
use toolbar_plugin_api::Config;

fn registry(builtin: &TempDir, user: &TempDir, config: Arc<Config>) -> PluginRegistry {
    PluginRegistry::new(
        RegistryConfig {
            builtin_plugin_dir: builtin.path().to_path_buf(),
            user_plugin_dir: user.path().to_path_buf(),
        },
        catalog(),
        config,
    )
}

#[test]
fn installed_builtins_become_active() {
    let builtin = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    install_builtins(builtin.path()).unwrap();

    let mut registry = registry(&builtin, &user, Arc::new(Config::in_memory()));
    registry.load_plugins();

    let names: Vec<&str> = registry.all_plugins().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["example", "scripts"]);
    assert!(registry.failed_plugins().is_empty());

    let widget = registry.get_plugin("example").unwrap().widget().unwrap();
    assert_eq!(widget.title(), "Example Plugin");
    assert!(widget.render().contains("Hello from the example plugin"));
}

#[test]
fn malformed_scripts_config_only_fails_scripts() {
    let builtin = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    install_builtins(builtin.path()).unwrap();

    let config = Arc::new(Config::in_memory());
    config.set("scripts", json!("not a list")).unwrap();

    let mut registry = registry(&builtin, &user, config);
    registry.load_plugins();

    assert!(registry.get_plugin("example").is_some());
    assert!(registry.get_plugin("scripts").is_none());
    assert!(registry.failed_plugins()["scripts"].contains("initialization failed"));
}

#[test]
fn example_activation_count_persists_to_config_file() {
    let builtin = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("config.json");
    install_builtins(builtin.path()).unwrap();

    for _ in 0..2 {
        let config = Arc::new(Config::load(&config_path).unwrap());
        let mut registry = registry(&builtin, &user, config);
        registry.load_plugins();
    }

    let config = Config::load(&config_path).unwrap();
    assert_eq!(
        config.get::<u64>("plugin_settings.example.activations"),
        Some(2)
    );
}

#[test]
fn user_copy_of_builtins_activates_once_across_rescans() {
    let builtin = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    install_builtins(builtin.path()).unwrap();
    install_builtins(user.path()).unwrap();

    let config = Arc::new(Config::in_memory());
    let mut registry = registry(&builtin, &user, config.clone());
    registry.load_plugins();
    let after_first = config.get::<u64>("plugin_settings.example.activations");

    registry.load_plugins();
    registry.load_plugins();

    // Built-in then user copy on the first scan, nothing on rescans
    assert_eq!(after_first, Some(2));
    assert_eq!(
        config.get::<u64>("plugin_settings.example.activations"),
        Some(2)
    );
    assert_eq!(
        registry.descriptor("example").unwrap().source_path,
        user.path().join("example")
    );
}
