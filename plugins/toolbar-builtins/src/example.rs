//! Example plugin - demonstrates the plugin system

use toolbar_plugin_api::{Plugin, PluginContext, PluginError, TextWidget, UiHandle};

/// Greeting shown when the manifest doesn't set one
pub const DEFAULT_GREETING: &str = "Hello from the example plugin";

/// Key in the plugin's settings namespace counting activations
const ACTIVATIONS_KEY: &str = "activations";

/// A simple plugin that greets and remembers how often it was started.
#[derive(Default)]
pub struct ExamplePlugin {
    greeting: Option<String>,
    /// Number of times this plugin has been initialized, across restarts
    activations: u64,
}

impl ExamplePlugin {
    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or(DEFAULT_GREETING)
    }

    pub fn activations(&self) -> u64 {
        self.activations
    }
}

impl Plugin for ExamplePlugin {
    fn name(&self) -> String {
        "example".to_string()
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn description(&self) -> String {
        "An example plugin to demonstrate the plugin system".to_string()
    }

    fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        self.greeting = Some(
            ctx.setting::<String>("greeting")
                .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        );

        self.activations = ctx.config_get::<u64>(ACTIVATIONS_KEY).unwrap_or(0) + 1;
        ctx.config_set(ACTIVATIONS_KEY, self.activations)?;

        ctx.log_info(&format!(
            "Example plugin initialized (activation {})",
            self.activations
        ));
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), PluginError> {
        if self.greeting.take().is_some() {
            tracing::info!(plugin = "example", "Example plugin cleaned up");
        }
        Ok(())
    }

    fn create_widget(&self) -> UiHandle {
        UiHandle::new(
            TextWidget::new("Example Plugin")
                .with_icon("help-about")
                .with_tooltip(self.description())
                .with_line(self.greeting())
                .with_line(format!("Activated {} time(s)", self.activations)),
        )
    }
}
