//! Shared configuration document
//!
//! The toolbar keeps its settings in a single JSON document addressed with
//! dot-path keys (`"ui.theme"`). One [`Config`] is created at startup and
//! handed by reference to the registry and to every plugin.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Key holding the flat list of disabled plugin names.
pub const DISABLED_PLUGINS_KEY: &str = "plugins.disabled";

/// Errors raised while reading or writing the configuration document
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be converted to or from JSON
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Empty key or empty path segment
    #[error("Invalid config key: '{0}'")]
    InvalidKey(String),
}

/// Read/write configuration handle backed by a JSON file
#[derive(Debug)]
pub struct Config {
    path: Option<PathBuf>,
    document: RwLock<Value>,
}

impl Config {
    /// Configuration with defaults and no backing file
    pub fn in_memory() -> Self {
        Self {
            path: None,
            document: RwLock::new(default_document()),
        }
    }

    /// Load configuration from a JSON file
    ///
    /// A missing file yields the defaults; values from an existing file are
    /// merged over them.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut document = default_document();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let loaded: Value =
                serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            merge(&mut document, loaded);
        }

        Ok(Self {
            path: Some(path),
            document: RwLock::new(document),
        })
    }

    /// Load the per-user configuration (`~/.config/toolbar/config.json`)
    pub fn open_default() -> Result<Self, ConfigError> {
        Self::load(toolbar_paths::config_file())
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read a value, `None` when missing or of a different type
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_value(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Read a value, falling back to `default`
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Raw JSON value at `key`
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let document = self.read();
        key.split('.')
            .try_fold(&*document, |node, segment| node.get(segment))
            .cloned()
    }

    /// Write a value in memory. Call [`Config::save`] to persist it.
    pub fn set<T: Serialize>(&self, key: &str, value: T) -> Result<(), ConfigError> {
        validate_key(key)?;
        let value = serde_json::to_value(value)?;
        insert(&mut self.write(), key, value);
        Ok(())
    }

    /// Remove a value, returning what was stored
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut document = self.write();
        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };

        let mut node = &mut *document;
        if let Some(parent) = parent {
            for segment in parent.split('.') {
                node = node.get_mut(segment)?;
            }
        }
        node.as_object_mut()?.remove(leaf)
    }

    /// Copy of the whole document
    pub fn snapshot(&self) -> Value {
        self.read().clone()
    }

    /// Persist the document. No-op for in-memory configs.
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(&*self.read())?;

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    // ─── Plugin enable/disable list ─────────────────────────────────

    /// Names currently on the disabled list
    pub fn disabled_plugins(&self) -> Vec<String> {
        self.get(DISABLED_PLUGINS_KEY).unwrap_or_default()
    }

    /// Check if a plugin is enabled (not on the disabled list)
    pub fn is_plugin_enabled(&self, name: &str) -> bool {
        !self.disabled_plugins().iter().any(|n| n == name)
    }

    /// Add a plugin to the disabled list and persist
    pub fn disable_plugin(&self, name: &str) -> Result<(), ConfigError> {
        let mut disabled = self.disabled_plugins();
        if disabled.iter().any(|n| n == name) {
            return Ok(());
        }
        let before = disabled.clone();
        disabled.push(name.to_string());
        self.store_disabled(before, disabled)
    }

    /// Remove a plugin from the disabled list and persist
    pub fn enable_plugin(&self, name: &str) -> Result<(), ConfigError> {
        let mut disabled = self.disabled_plugins();
        let before = disabled.clone();
        disabled.retain(|n| n != name);
        if disabled.len() == before.len() {
            return Ok(());
        }
        self.store_disabled(before, disabled)
    }

    /// Write the disabled list and save; the old list is restored if saving fails
    fn store_disabled(&self, before: Vec<String>, after: Vec<String>) -> Result<(), ConfigError> {
        self.set(DISABLED_PLUGINS_KEY, after)?;
        if let Err(e) = self.save() {
            self.set(DISABLED_PLUGINS_KEY, before)?;
            return Err(e);
        }
        Ok(())
    }

    // A panicking writer cannot leave the document half-updated: every
    // mutation is a single insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.document.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.document.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn default_document() -> Value {
    json!({
        "ui": {
            "opacity": 1.0,
            "stay_on_top": true,
            "position": "top"
        },
        "plugins": {
            "disabled": []
        },
        "scripts": []
    })
}

fn validate_key(key: &str) -> Result<(), ConfigError> {
    if key.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn insert(root: &mut Value, key: &str, value: Value) {
    let (parent, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };

    let mut node = root;
    if let Some(parent) = parent {
        for segment in parent.split('.') {
            node = as_object(node)
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
    as_object(node).insert(leaf.to_string(), value);
}

/// Object view of `node`, replacing scalars and arrays with an empty object.
fn as_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was replaced with an object above"),
    }
}

/// Deep-merge `overlay` into `base`; objects merge key by key, anything else replaces.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
