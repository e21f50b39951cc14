//! XDG Base Directory paths for toolbar.
//!
//! The toolbar uses XDG paths on every platform so that configuration and
//! user plugins live in the same place regardless of desktop environment.

use std::path::PathBuf;

/// Name of the configuration document inside [`config_dir`].
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Get the toolbar config directory.
///
/// Returns `$XDG_CONFIG_HOME/toolbar` if set, otherwise `~/.config/toolbar`.
/// This is where the configuration document and user plugins are stored.
///
/// # Examples
///
/// ```
/// use toolbar_paths::config_dir;
///
/// let config = config_dir();
/// let plugin_dir = config.join("plugins");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("toolbar")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/toolbar")
    } else {
        PathBuf::from(".config/toolbar")
    }
}

/// Path of the configuration document.
pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Per-user plugin directory (`<config_dir>/plugins`).
pub fn user_plugin_dir() -> PathBuf {
    config_dir().join("plugins")
}

/// Directory holding the plugins shipped with the toolbar.
///
/// `TOOLBAR_BUILTIN_PLUGIN_DIR` overrides the default, which is `plugins/`
/// next to the running executable.
pub fn builtin_plugin_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TOOLBAR_BUILTIN_PLUGIN_DIR") {
        return PathBuf::from(dir);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("plugins")))
        .unwrap_or_else(|| PathBuf::from("plugins"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_dir_ends_with_toolbar() {
        let path = config_dir();
        assert!(
            path.ends_with("toolbar"),
            "config_dir should end with 'toolbar'"
        );
    }

    #[test]
    #[serial]
    fn test_config_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-config");
        }
        assert_eq!(config_dir(), PathBuf::from("/tmp/test-config/toolbar"));
        assert_eq!(
            config_file(),
            PathBuf::from("/tmp/test-config/toolbar/config.json")
        );
        assert_eq!(
            user_plugin_dir(),
            PathBuf::from("/tmp/test-config/toolbar/plugins")
        );
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_builtin_plugin_dir_override() {
        unsafe {
            std::env::set_var("TOOLBAR_BUILTIN_PLUGIN_DIR", "/opt/toolbar/plugins");
        }
        assert_eq!(builtin_plugin_dir(), PathBuf::from("/opt/toolbar/plugins"));
        unsafe {
            std::env::remove_var("TOOLBAR_BUILTIN_PLUGIN_DIR");
        }
    }

    #[test]
    #[serial]
    fn test_builtin_plugin_dir_defaults_next_to_executable() {
        assert!(builtin_plugin_dir().ends_with("plugins"));
    }
}
