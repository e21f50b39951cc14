//! PluginRegistry - discovers, loads and tracks plugins

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use toolbar_plugin_api::{Config, PluginContext, PluginDescriptor};

use super::catalog::PluginCatalog;
use super::discovery::{self, Candidate, Scanned};
use super::error::{PluginFailure, RegistryError};
use super::instance::{PluginInstance, PluginState};

/// Config key overriding the user plugin directory
pub const USER_DIR_KEY: &str = "plugins.user_dir";
/// Config key overriding the built-in plugin directory
pub const BUILTIN_DIR_KEY: &str = "plugins.builtin_dir";

/// Search directories for [`PluginRegistry`]
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    /// Plugins shipped with the toolbar (searched first)
    pub builtin_plugin_dir: PathBuf,
    /// Per-user plugins (searched last, shadows built-ins)
    pub user_plugin_dir: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            builtin_plugin_dir: toolbar_paths::builtin_plugin_dir(),
            user_plugin_dir: toolbar_paths::user_plugin_dir(),
        }
    }
}

impl RegistryConfig {
    /// Defaults, overridden by `plugins.builtin_dir` / `plugins.user_dir`
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            builtin_plugin_dir: config
                .get(BUILTIN_DIR_KEY)
                .unwrap_or(defaults.builtin_plugin_dir),
            user_plugin_dir: config
                .get(USER_DIR_KEY)
                .unwrap_or(defaults.user_plugin_dir),
        }
    }
}

/// A failure recorded against a plugin name
#[derive(Debug, Clone)]
struct FailedPlugin {
    source_path: PathBuf,
    failure: PluginFailure,
}

/// The plugin registry owns every plugin instance for the life of the host.
///
/// No error raised by plugin code escapes its public operations: failures
/// are logged and recorded in [`PluginRegistry::failed_plugins`], and the
/// remaining plugins keep loading.
pub struct PluginRegistry {
    /// Directories to search, built-in first
    search_dirs: Vec<PathBuf>,
    catalog: PluginCatalog,
    config: Arc<Config>,
    /// Active plugins by name
    active: BTreeMap<String, PluginInstance>,
    /// Failures from the most recent scan, by plugin name
    failed: BTreeMap<String, FailedPlugin>,
    /// Names on the disabled list
    disabled: BTreeSet<String>,
}

impl PluginRegistry {
    /// Create a registry. Nothing is loaded until [`PluginRegistry::load_plugins`].
    pub fn new(registry_config: RegistryConfig, catalog: PluginCatalog, config: Arc<Config>) -> Self {
        let mut search_dirs = vec![registry_config.builtin_plugin_dir];
        if !search_dirs.contains(&registry_config.user_plugin_dir) {
            search_dirs.push(registry_config.user_plugin_dir);
        }

        Self {
            search_dirs,
            catalog,
            config,
            active: BTreeMap::new(),
            failed: BTreeMap::new(),
            disabled: BTreeSet::new(),
        }
    }

    /// Discover and load every enabled plugin.
    ///
    /// Safe to call repeatedly: plugins already active from the same
    /// directory are kept as-is, new directories are loaded, failed ones are
    /// retried. Active plugins whose directory disappeared stay loaded.
    pub fn load_plugins(&mut self) {
        let mut previous = std::mem::take(&mut self.active);
        let previous_failed = std::mem::take(&mut self.failed);
        let mut loaded = BTreeMap::new();
        self.disabled = self.config.disabled_plugins().into_iter().collect();

        for (rank, dir) in self.search_dirs.clone().into_iter().enumerate() {
            for scanned in discovery::scan_directory(&dir) {
                match scanned {
                    Scanned::Candidate(candidate) => self.load_candidate(
                        candidate,
                        rank,
                        &mut previous,
                        &previous_failed,
                        &mut loaded,
                    ),
                    Scanned::Invalid {
                        dir_name,
                        path,
                        failure,
                    } => self.record_failure(dir_name, path, failure),
                }
            }
        }

        // Plugins from directories that were not seen this time
        for (name, instance) in previous {
            if loaded.contains_key(&name) || !self.config.is_plugin_enabled(&name) {
                shutdown(instance);
            } else {
                loaded.insert(name, instance);
            }
        }

        self.active = loaded;

        tracing::info!(count = self.active.len(), "Loaded plugins");
        if !self.failed.is_empty() {
            tracing::warn!(count = self.failed.len(), "Some plugins failed to load");
        }
    }

    fn load_candidate(
        &mut self,
        candidate: Candidate,
        rank: usize,
        previous: &mut BTreeMap<String, PluginInstance>,
        previous_failed: &BTreeMap<String, FailedPlugin>,
        loaded: &mut BTreeMap<String, PluginInstance>,
    ) {
        let Candidate {
            dir_name,
            path,
            manifest,
        } = &candidate;

        if !self.config.is_plugin_enabled(dir_name) {
            tracing::debug!(plugin = %dir_name, "Plugin disabled, skipping");
            for instance in take_from_source(previous, path) {
                shutdown(instance);
            }
            return;
        }

        // Already running from this directory: keep the instances and the
        // failures of their siblings instead of constructing them again.
        let reused = take_from_source(previous, path);
        if !reused.is_empty() {
            for instance in reused {
                if self.config.is_plugin_enabled(instance.name()) {
                    self.activate(loaded, instance);
                } else {
                    tracing::debug!(plugin = %instance.name(), "Plugin disabled, unloading");
                    shutdown(instance);
                }
            }
            for (name, failed) in previous_failed {
                if failed.source_path == *path && !loaded.contains_key(name) {
                    self.failed.insert(name.clone(), failed.clone());
                }
            }
            return;
        }

        let module = candidate.module();
        let factories = self.catalog.factories(module);
        if factories.is_empty() {
            tracing::warn!(plugin = %dir_name, module = %module, "No plugin class found");
            self.record_failure(dir_name.clone(), path.clone(), PluginFailure::NoPluginClass);
            return;
        }

        let constructed: Vec<_> = factories
            .iter()
            .map(|factory| {
                catch_unwind(AssertUnwindSafe(|| PluginInstance::new(factory(), path)))
                    .map_err(|payload| PluginFailure::panicked("construction", payload))
            })
            .collect();

        let mut built = Vec::with_capacity(constructed.len());
        for result in constructed {
            match result {
                Ok(instance) => built.push(instance),
                Err(failure) => {
                    tracing::error!(plugin = %dir_name, error = %failure, "Failed to construct plugin");
                    self.record_failure(dir_name.clone(), path.clone(), failure);
                }
            }
        }

        for mut instance in built {
            let name = instance.name().to_string();
            if !self.config.is_plugin_enabled(&name) {
                tracing::debug!(plugin = %name, "Plugin disabled, skipping");
                continue;
            }
            if self.shadowed_by_running(previous, &name, rank) {
                tracing::debug!(
                    plugin = %name,
                    path = %path.display(),
                    "Plugin already running from a later search directory, skipping"
                );
                continue;
            }

            let mut ctx = PluginContext::new(name.clone(), path.clone(), Arc::clone(&self.config))
                .with_settings(manifest.settings.clone());

            match instance.initialize(&mut ctx) {
                Ok(()) => {
                    tracing::info!(
                        plugin = %name,
                        version = %instance.descriptor().version,
                        "Plugin loaded"
                    );
                    self.activate(loaded, instance);
                }
                Err(failure) => {
                    tracing::error!(plugin = %name, error = %failure, "Failed to initialize plugin");
                    self.record_failure(name, path.clone(), failure);
                }
            }
        }
    }

    /// Whether `name` is already running from an enabled directory in a
    /// search dir after `rank`. Such an instance will win the name again, so
    /// the candidate is never initialized.
    fn shadowed_by_running(
        &self,
        previous: &BTreeMap<String, PluginInstance>,
        name: &str,
        rank: usize,
    ) -> bool {
        let Some(running) = previous.get(name) else {
            return false;
        };
        let source = &running.descriptor().source_path;
        let dir_enabled = source
            .file_name()
            .and_then(|dir| dir.to_str())
            .is_none_or(|dir| self.config.is_plugin_enabled(dir));
        dir_enabled && self.search_rank(source).is_some_and(|later| later > rank)
    }

    /// Index into the search dirs of the directory holding `source`
    fn search_rank(&self, source: &Path) -> Option<usize> {
        let parent = source.parent()?;
        self.search_dirs.iter().position(|dir| dir == parent)
    }

    /// Register an initialized instance; a later plugin with the same name
    /// replaces the earlier one.
    fn activate(&mut self, loaded: &mut BTreeMap<String, PluginInstance>, instance: PluginInstance) {
        let name = instance.name().to_string();
        self.failed.remove(&name);
        if let Some(displaced) = loaded.insert(name.clone(), instance) {
            tracing::info!(
                plugin = %name,
                shadowed = %displaced.descriptor().source_path.display(),
                "Plugin shadowed by a later search directory"
            );
            shutdown(displaced);
        }
    }

    fn record_failure(&mut self, name: String, source_path: PathBuf, failure: PluginFailure) {
        self.failed.insert(
            name,
            FailedPlugin {
                source_path,
                failure,
            },
        );
    }

    /// Get an active plugin by name
    pub fn get_plugin(&self, name: &str) -> Option<&PluginInstance> {
        self.active.get(name)
    }

    /// All active plugins, keyed by name
    pub fn all_plugins(&self) -> &BTreeMap<String, PluginInstance> {
        &self.active
    }

    /// Plugins that failed to load, with the reason
    pub fn failed_plugins(&self) -> BTreeMap<String, String> {
        self.failed
            .iter()
            .map(|(name, failed)| (name.clone(), failed.failure.to_string()))
            .collect()
    }

    /// Typed failure for `name`, if it failed during the last scan
    pub fn failure(&self, name: &str) -> Option<&PluginFailure> {
        self.failed.get(name).map(|failed| &failed.failure)
    }

    /// Descriptor of an active plugin
    pub fn descriptor(&self, name: &str) -> Option<&PluginDescriptor> {
        self.active.get(name).map(PluginInstance::descriptor)
    }

    /// State of every plugin the registry knows about
    pub fn plugin_states(&self) -> BTreeMap<String, PluginState> {
        let mut states: BTreeMap<String, PluginState> = self
            .disabled
            .iter()
            .map(|name| (name.clone(), PluginState::Disabled))
            .collect();
        for (name, failed) in &self.failed {
            states.insert(
                name.clone(),
                PluginState::Failed {
                    error: failed.failure.to_string(),
                },
            );
        }
        for (name, instance) in &self.active {
            states.insert(name.clone(), instance.state().clone());
        }
        states
    }

    /// Persist the disabled flag, then clean the plugin up and drop it.
    ///
    /// If the configuration cannot be saved the error is returned and the
    /// plugin keeps running. Errors from the plugin's own cleanup are logged,
    /// never returned.
    pub fn disable_plugin(&mut self, name: &str) -> Result<(), RegistryError> {
        self.config.disable_plugin(name)?;
        if let Some(instance) = self.active.remove(name) {
            shutdown(instance);
        }
        self.disabled.insert(name.to_string());
        tracing::info!(plugin = %name, "Plugin disabled");
        Ok(())
    }

    /// Clear the disabled flag and rescan so the plugin loads again
    pub fn enable_plugin(&mut self, name: &str) -> Result<(), RegistryError> {
        self.config.enable_plugin(name)?;
        self.disabled.remove(name);
        tracing::info!(plugin = %name, "Plugin enabled");
        self.load_plugins();
        Ok(())
    }

    /// Tear down a plugin and load it again from disk
    pub fn reload_plugin(&mut self, name: &str) -> Result<(), RegistryError> {
        if !self.active.contains_key(name) && !self.failed.contains_key(name) {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
            });
        }

        if let Some(instance) = self.active.remove(name) {
            shutdown(instance);
        }
        self.load_plugins();
        Ok(())
    }

    /// Clean up every active plugin and empty the registry
    pub fn cleanup(&mut self) {
        for (_, instance) in std::mem::take(&mut self.active) {
            shutdown(instance);
        }
        self.failed.clear();
    }

    /// Number of active plugins
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Directories searched for plugins, in search order
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// The shared configuration handle
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The catalog plugin directories are resolved against
    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }
}

impl Drop for PluginRegistry {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Remove every instance loaded from `source`
fn take_from_source(
    instances: &mut BTreeMap<String, PluginInstance>,
    source: &Path,
) -> Vec<PluginInstance> {
    let names: Vec<String> = instances
        .iter()
        .filter(|(_, instance)| instance.descriptor().source_path == source)
        .map(|(name, _)| name.clone())
        .collect();
    names
        .iter()
        .filter_map(|name| instances.remove(name))
        .collect()
}

/// Run a plugin's cleanup, logging failures, and drop it
fn shutdown(mut instance: PluginInstance) {
    match instance.cleanup() {
        Ok(()) => tracing::info!(plugin = %instance.name(), "Cleaned up plugin"),
        Err(failure) => {
            tracing::error!(plugin = %instance.name(), error = %failure, "Error cleaning up plugin")
        }
    }
}
