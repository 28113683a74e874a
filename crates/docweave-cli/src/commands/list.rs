use std::path::Path;

use anyhow::{Context, Result};

use docweave_core::registry::TemplateRegistry;

use crate::output;

/// Load every supported template under a directory and list them.
///
/// Loading is the point: a template that fails to load (corrupt container, directive
/// that does not compile) fails the command.
pub fn run(config_path: &Path, dir_override: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let dir = dir_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.template_dir.clone());

    output::print_header(&format!("docweave templates: {}", dir.display()));

    let mut registry = TemplateRegistry::new(config);
    docweave_docx::register(&mut registry);
    registry
        .load_dir(&dir)
        .with_context(|| format!("loading templates from {}", dir.display()))?;

    if registry.is_empty() {
        output::print_warning("No templates found");
        return Ok(());
    }

    for template in registry.iter() {
        eprintln!();
        output::print_template(template.as_ref());
    }
    eprintln!();
    output::print_success(&format!("{} template(s) loaded", registry.len()));

    Ok(())
}
