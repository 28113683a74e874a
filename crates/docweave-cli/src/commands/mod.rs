//! CLI command implementations for docweave.
//!
//! Each module corresponds to a subcommand (`docweave <command>`).

pub mod list;
pub mod preprocess;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};

use docweave_core::config::EngineConfig;

/// Load the engine config, falling back to defaults when the file is absent.
pub(crate) fn load_config(config_path: &Path) -> Result<EngineConfig> {
    let config = EngineConfig::load_or_default(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    tracing::debug!(
        "template_dir={} strict_mode={}",
        config.template_dir.display(),
        config.strict_mode
    );
    Ok(config)
}
