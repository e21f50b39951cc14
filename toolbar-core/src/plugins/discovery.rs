//! Plugin directory scanning

use std::path::{Path, PathBuf};

use toolbar_plugin_api::{MANIFEST_FILE, PluginManifest};

use super::error::PluginFailure;

/// A plugin directory with a readable manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Directory name, also the name checked against the disabled list
    pub dir_name: String,
    /// Full path of the plugin directory
    pub path: PathBuf,
    /// Parsed `plugin.toml`
    pub manifest: PluginManifest,
}

impl Candidate {
    /// Catalog module this candidate resolves to
    pub fn module(&self) -> &str {
        self.manifest.module_or(&self.dir_name)
    }
}

/// Outcome of inspecting one entry of a search directory
#[derive(Debug, Clone, PartialEq)]
pub enum Scanned {
    Candidate(Candidate),
    /// Looked like a plugin package but could not be read
    Invalid {
        dir_name: String,
        path: PathBuf,
        failure: PluginFailure,
    },
}

/// Names the scanner never treats as plugins (`__pycache__`, `.git`, ...)
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with("__") || name.starts_with('.')
}

/// Enumerate the plugin packages directly under `dir`, sorted by name.
///
/// A missing or unreadable directory yields nothing; entries that are not
/// directories, have a reserved name, or lack `plugin.toml` are skipped.
pub fn scan_directory(dir: &Path) -> Vec<Scanned> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "Plugin directory does not exist");
        return Vec::new();
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Cannot read plugin directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Cannot read plugin directory entry");
                None
            }
        })
        .filter(|path| path.is_dir())
        .collect();
    paths.sort();

    paths.into_iter().filter_map(inspect).collect()
}

fn inspect(path: PathBuf) -> Option<Scanned> {
    let Some(dir_name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
        tracing::warn!(path = %path.display(), "Skipping plugin directory with non UTF-8 name");
        return None;
    };

    if is_reserved_name(&dir_name) {
        return None;
    }

    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        tracing::debug!(plugin = %dir_name, "No {} found, skipping", MANIFEST_FILE);
        return None;
    }

    match PluginManifest::load(&manifest_path) {
        Ok(manifest) => Some(Scanned::Candidate(Candidate {
            dir_name,
            path,
            manifest,
        })),
        Err(e) => {
            tracing::warn!(plugin = %dir_name, error = %e, "Invalid plugin manifest");
            Some(Scanned::Invalid {
                dir_name,
                path,
                failure: PluginFailure::Discovery(e.to_string()),
            })
        }
    }
}
