//! Scripts plugin - lists the user's configured scripts on the toolbar

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolbar_plugin_api::{Plugin, PluginContext, PluginError, TextWidget, UiHandle};

/// Config key holding the script list
pub const SCRIPTS_KEY: &str = "scripts";

/// One entry of the `scripts` config list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Default)]
pub struct ScriptsPlugin {
    scripts: Vec<ScriptEntry>,
}

impl ScriptsPlugin {
    pub fn scripts(&self) -> &[ScriptEntry] {
        &self.scripts
    }
}

impl Plugin for ScriptsPlugin {
    fn name(&self) -> String {
        "scripts".to_string()
    }

    fn description(&self) -> String {
        "Quick access to configured scripts".to_string()
    }

    fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        let raw = ctx
            .config()
            .get_value(SCRIPTS_KEY)
            .unwrap_or_else(|| Value::Array(Vec::new()));

        self.scripts = serde_json::from_value(raw)
            .map_err(|e| PluginError::config(format!("invalid '{}' list: {}", SCRIPTS_KEY, e)))?;

        for script in self.scripts.iter().filter(|s| !s.path.exists()) {
            ctx.log_warn(&format!(
                "Script '{}' not found at {}",
                script.name,
                script.path.display()
            ));
        }

        ctx.log_info(&format!("Loaded {} script(s)", self.scripts.len()));
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), PluginError> {
        self.scripts.clear();
        Ok(())
    }

    fn create_widget(&self) -> UiHandle {
        let mut widget = TextWidget::new("Scripts")
            .with_icon("utilities-terminal")
            .with_tooltip(self.description());

        if self.scripts.is_empty() {
            widget = widget.with_line("No scripts configured");
        }
        for script in &self.scripts {
            widget = widget.with_line(&script.name);
        }

        UiHandle::new(widget)
    }
}
