//! Error types for plugin authors

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that plugins can return
#[derive(Error, Debug)]
pub enum PluginError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A resource the plugin depends on is not available
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl PluginError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an unavailable-resource error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

impl From<ConfigError> for PluginError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = PluginError::Config("missing key".to_string());
        assert_eq!(config_err.to_string(), "Configuration error: missing key");

        let unavailable = PluginError::Unavailable("no audio device".to_string());
        assert_eq!(unavailable.to_string(), "Unavailable: no audio device");

        let custom_err = PluginError::Custom("something happened".to_string());
        assert_eq!(custom_err.to_string(), "something happened");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let plugin_err: PluginError = io_err.into();

        assert!(matches!(plugin_err, PluginError::Io(_)));
        assert!(plugin_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: PluginError = ConfigError::InvalidKey("a..b".into()).into();
        assert!(matches!(err, PluginError::Config(_)));
        assert!(err.to_string().contains("a..b"));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(PluginError::custom("test"), PluginError::Custom(_)));
        assert!(matches!(
            PluginError::config("bad config"),
            PluginError::Config(_)
        ));
        assert!(matches!(
            PluginError::unavailable("gone"),
            PluginError::Unavailable(_)
        ));
    }
}
