//! Plugin registry error types

use std::any::Any;
use thiserror::Error;
use toolbar_plugin_api::ConfigError;

/// Why a plugin did not become active, or misbehaved on the way out.
///
/// These never escape the registry's public operations; they are logged and,
/// except for `Cleanup`, recorded against the plugin name.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginFailure {
    /// Plugin directory unreadable or its manifest malformed
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// Manifest resolved to a module with no plugin types
    #[error("no plugin class found")]
    NoPluginClass,

    /// `initialize` returned an error
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// `cleanup` returned an error
    #[error("cleanup failed: {0}")]
    Cleanup(String),

    /// Plugin code panicked
    #[error("panicked during {stage}: {message}")]
    Panicked {
        stage: &'static str,
        message: String,
    },
}

impl PluginFailure {
    pub(crate) fn panicked(stage: &'static str, payload: Box<dyn Any + Send>) -> Self {
        Self::Panicked {
            stage,
            message: panic_message(payload.as_ref()),
        }
    }
}

/// Errors surfaced to the host. Plugin-originated failures are never
/// reported through this type.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Persisting the enabled/disabled list failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plugin not known to the registry
    #[error("Plugin '{name}' not found")]
    NotFound { name: String },
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
