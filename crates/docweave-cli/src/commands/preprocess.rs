use std::path::Path;

use anyhow::{Context, Result};

use docweave_docx::{DocxTemplate, MAIN_DOCUMENT};

use crate::output;

/// Print (or write) the document body as the template compiler sees it.
///
/// Useful for finding out why a directive did not collapse the way it was meant to.
pub fn run(config_path: &Path, template_path: &Path, output_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let template = DocxTemplate::load_with(template_path, &config)
        .with_context(|| format!("loading template {}", template_path.display()))?;
    let markup = template.preprocessed_markup()?;

    match output_path {
        Some(path) => {
            std::fs::write(path, &markup)
                .with_context(|| format!("writing {}", path.display()))?;
            output::print_success(&format!("Wrote preprocessed {MAIN_DOCUMENT}"));
            output::print_key_value("Output", &path.display().to_string());
        }
        None => println!("{markup}"),
    }

    Ok(())
}
