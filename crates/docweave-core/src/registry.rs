//! Name-indexed collection of loaded templates.
//!
//! Loaders are registered per file extension; [`TemplateRegistry::load_dir`] walks a
//! directory tree and loads every file it has a loader for. Templates are keyed by
//! [`DocumentTemplate::name`], so two files with the same name in different
//! subdirectories resolve to whichever was loaded last.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::error::{DocweaveError, Result};
use crate::template::DocumentTemplate;

/// Loads one template file into a handle.
pub type Loader = fn(&Path, &EngineConfig) -> Result<Arc<dyn DocumentTemplate>>;

#[derive(Default)]
pub struct TemplateRegistry {
    config: EngineConfig,
    loaders: HashMap<String, Loader>,
    templates: BTreeMap<String, Arc<dyn DocumentTemplate>>,
}

impl TemplateRegistry {
    /// Empty registry; loaders receive `config` when they run.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            loaders: HashMap::new(),
            templates: BTreeMap::new(),
        }
    }

    /// Associate a file extension (without dot, case-insensitive) with a loader.
    pub fn register_loader(&mut self, extension: &str, loader: Loader) {
        self.loaders.insert(extension.to_ascii_lowercase(), loader);
    }

    /// Load a single file with the loader registered for its extension.
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<dyn DocumentTemplate>> {
        let ext = extension_of(path);
        let loader = self
            .loaders
            .get(&ext)
            .ok_or_else(|| DocweaveError::UnsupportedFormat(path.display().to_string()))?;
        let template = loader(path, &self.config)?;
        self.insert(Arc::clone(&template));
        Ok(template)
    }

    /// Load every supported file under `root`, recursively.
    ///
    /// Files without a registered loader are skipped. The first load failure aborts
    /// the walk. Returns the number of templates loaded.
    pub fn load_dir(&mut self, root: &Path) -> Result<usize> {
        let mut loaded = 0;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                DocweaveError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other(format!("walking {}", root.display()))
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.loaders.contains_key(&extension_of(entry.path())) {
                tracing::trace!("skipping {}", entry.path().display());
                continue;
            }
            let template = self.load_file(entry.path())?;
            tracing::debug!("registered template {}", template.name());
            loaded += 1;
        }
        tracing::info!("loaded {loaded} templates from {}", root.display());
        Ok(loaded)
    }

    /// Add an already-loaded template, replacing any with the same name.
    pub fn insert(&mut self, template: Arc<dyn DocumentTemplate>) {
        self.templates.insert(template.name().to_string(), template);
    }

    /// Look up a template by display name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DocumentTemplate>> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| DocweaveError::TemplateNotFound(name.to_string()))
    }

    /// Template names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Templates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DocumentTemplate>> {
        self.templates.values()
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Settings handed to every loader.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}
