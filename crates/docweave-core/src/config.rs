//! Engine configuration loaded from `docweave.config.json`.
//!
//! Every field has a default, so a missing file or a partial file is fine:
//!
//! ```json
//! {
//!   "template_dir": "templates",
//!   "strict_mode": true
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocweaveError, Result};

/// Default file name looked up by the CLI.
pub const CONFIG_FILE: &str = "docweave.config.json";

/// Settings shared by template loading and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory scanned by [`crate::registry::TemplateRegistry::load_dir`].
    pub template_dir: PathBuf,
    /// Treat references to missing context fields as render errors.
    pub strict_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("templates"),
            strict_mode: true,
        }
    }
}

impl EngineConfig {
    /// Load the config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| DocweaveError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        serde_json::from_str(&contents).map_err(|e| DocweaveError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the config, falling back to defaults when the file does not exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| DocweaveError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
