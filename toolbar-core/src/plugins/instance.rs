//! A constructed plugin and its lifecycle state

use std::cell::OnceCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use toolbar_plugin_api::{Plugin, PluginContext, PluginDescriptor, UiHandle};

use super::error::PluginFailure;

/// Lifecycle state of a plugin
#[derive(Debug, Clone, PartialEq)]
pub enum PluginState {
    /// Constructed, `initialize` not yet run
    Uninitialized,
    /// Initialized and placed on the toolbar
    Active,
    /// Construction or `initialize` failed
    Failed { error: String },
    /// Turned off by the user, or torn down
    Disabled,
}

/// A live plugin object owned by the registry
pub struct PluginInstance {
    descriptor: PluginDescriptor,
    plugin: Box<dyn Plugin>,
    state: PluginState,
    widget: OnceCell<UiHandle>,
    cleaned_up: bool,
}

impl PluginInstance {
    /// Wrap a freshly constructed plugin loaded from `source_path`
    pub(crate) fn new(plugin: Box<dyn Plugin>, source_path: &Path) -> Self {
        let descriptor = PluginDescriptor::new(
            plugin.name(),
            plugin.version(),
            plugin.description(),
            source_path,
        );
        Self {
            descriptor,
            plugin,
            state: PluginState::Uninitialized,
            widget: OnceCell::new(),
            cleaned_up: false,
        }
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn state(&self) -> &PluginState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == PluginState::Active
    }

    /// Failure message, present only in the `Failed` state
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            PluginState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// The plugin's toolbar widget.
    ///
    /// Built on first call and cached, so every call returns the same handle.
    /// Returns `None` unless the plugin is active, or if building the widget
    /// panicked.
    pub fn widget(&self) -> Option<UiHandle> {
        if !self.is_active() {
            return None;
        }
        if let Some(handle) = self.widget.get() {
            return Some(handle.clone());
        }

        match catch_unwind(AssertUnwindSafe(|| self.plugin.create_widget())) {
            Ok(handle) => Some(self.widget.get_or_init(|| handle).clone()),
            Err(payload) => {
                let failure = PluginFailure::panicked("create_widget", payload);
                tracing::error!(plugin = %self.name(), error = %failure, "Plugin widget construction failed");
                None
            }
        }
    }

    /// Run `initialize`, moving to `Active` or `Failed`.
    ///
    /// On failure the plugin's `cleanup` runs to release anything acquired
    /// before the error.
    pub(crate) fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginFailure> {
        let result = catch_unwind(AssertUnwindSafe(|| self.plugin.initialize(ctx)));

        let failure = match result {
            Ok(Ok(())) => {
                self.state = PluginState::Active;
                return Ok(());
            }
            Ok(Err(e)) => PluginFailure::Initialization(e.to_string()),
            Err(payload) => PluginFailure::panicked("initialize", payload),
        };

        self.state = PluginState::Failed {
            error: failure.to_string(),
        };
        if let Err(cleanup_failure) = self.cleanup() {
            tracing::warn!(
                plugin = %self.name(),
                error = %cleanup_failure,
                "Cleanup after failed initialization also failed"
            );
        }
        Err(failure)
    }

    /// Run the plugin's `cleanup` and drop its widget.
    ///
    /// Active plugins move to `Disabled`; a `Failed` state is kept so the
    /// reason stays visible.
    pub(crate) fn cleanup(&mut self) -> Result<(), PluginFailure> {
        self.cleaned_up = true;
        self.widget.take();
        if self.is_active() {
            self.state = PluginState::Disabled;
        }

        match catch_unwind(AssertUnwindSafe(|| self.plugin.cleanup())) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PluginFailure::Cleanup(e.to_string())),
            Err(payload) => Err(PluginFailure::panicked("cleanup", payload)),
        }
    }
}

impl Drop for PluginInstance {
    fn drop(&mut self) {
        // Instances dropped without an explicit teardown still release their resources
        if self.cleaned_up || self.state != PluginState::Active {
            return;
        }
        if let Err(failure) = self.cleanup() {
            tracing::warn!(plugin = %self.name(), error = %failure, "Plugin cleanup on drop failed");
        }
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("descriptor", &self.descriptor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use toolbar_plugin_api::{Config, PluginError, TextWidget};

    #[derive(Default)]
    struct Counters {
        cleanups: AtomicUsize,
        widgets: AtomicUsize,
    }

    struct TestPlugin {
        counters: Arc<Counters>,
        fail_init: bool,
    }

    impl Plugin for TestPlugin {
        fn name(&self) -> String {
            "test".into()
        }

        fn initialize(&mut self, _ctx: &mut PluginContext) -> Result<(), PluginError> {
            if self.fail_init {
                return Err(PluginError::unavailable("no microphone"));
            }
            Ok(())
        }

        fn cleanup(&mut self) -> Result<(), PluginError> {
            self.counters.cleanups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn create_widget(&self) -> UiHandle {
            self.counters.widgets.fetch_add(1, Ordering::SeqCst);
            UiHandle::new(TextWidget::new("Test"))
        }
    }

    fn instance(fail_init: bool) -> (PluginInstance, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let plugin = TestPlugin {
            counters: counters.clone(),
            fail_init,
        };
        (
            PluginInstance::new(Box::new(plugin), Path::new("/plugins/test")),
            counters,
        )
    }

    fn context() -> PluginContext {
        PluginContext::new(
            "test".into(),
            PathBuf::from("/plugins/test"),
            Arc::new(Config::in_memory()),
        )
    }

    #[test]
    fn test_new_instance_is_uninitialized() {
        let (instance, _) = instance(false);
        assert_eq!(instance.state(), &PluginState::Uninitialized);
        assert_eq!(instance.descriptor().name, "test");
        assert_eq!(instance.descriptor().version, "1.0.0");
        assert_eq!(
            instance.descriptor().source_path,
            PathBuf::from("/plugins/test")
        );
        assert!(instance.widget().is_none());
    }

    #[test]
    fn test_widget_is_cached() {
        let (mut instance, counters) = instance(false);
        instance.initialize(&mut context()).unwrap();

        let first = instance.widget().unwrap();
        let second = instance.widget().unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(counters.widgets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_initialize_hides_widget_and_cleans_up() {
        let (mut instance, counters) = instance(true);
        let failure = instance.initialize(&mut context()).unwrap_err();

        assert!(matches!(failure, PluginFailure::Initialization(_)));
        assert!(instance.error_message().unwrap().contains("no microphone"));
        assert!(instance.widget().is_none());
        assert_eq!(counters.widgets.load(Ordering::SeqCst), 0);
        assert_eq!(counters.cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cleanup_moves_active_to_disabled() {
        let (mut instance, counters) = instance(false);
        instance.initialize(&mut context()).unwrap();

        instance.cleanup().unwrap();
        assert_eq!(instance.state(), &PluginState::Disabled);
        assert!(instance.widget().is_none());

        drop(instance);
        assert_eq!(counters.cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cleans_up_active_instance() {
        let (mut instance, counters) = instance(false);
        instance.initialize(&mut context()).unwrap();

        drop(instance);
        assert_eq!(counters.cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_skips_uninitialized_instance() {
        let (instance, counters) = instance(false);
        drop(instance);
        assert_eq!(counters.cleanups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panic_in_initialize_is_contained() {
        struct PanickyPlugin;
        impl Plugin for PanickyPlugin {
            fn initialize(&mut self, _ctx: &mut PluginContext) -> Result<(), PluginError> {
                panic!("engine exploded");
            }
            fn cleanup(&mut self) -> Result<(), PluginError> {
                Ok(())
            }
            fn create_widget(&self) -> UiHandle {
                UiHandle::new(TextWidget::new("never"))
            }
        }

        let mut instance = PluginInstance::new(Box::new(PanickyPlugin), Path::new("/p"));
        let failure = instance.initialize(&mut context()).unwrap_err();
        assert_eq!(
            failure,
            PluginFailure::Panicked {
                stage: "initialize",
                message: "engine exploded".into()
            }
        );
        assert!(matches!(instance.state(), PluginState::Failed { .. }));
    }
}
