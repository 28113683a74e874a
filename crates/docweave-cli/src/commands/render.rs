use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use docweave_core::template::DocumentTemplate;
use docweave_docx::DocxTemplate;

use crate::output;

/// Render a template against a JSON data context and write the document.
///
/// The output file is only created once rendering succeeded, so a failed render never
/// leaves a truncated document behind.
pub fn run(
    config_path: &Path,
    template_path: &Path,
    data_path: &Path,
    output_path: Option<&Path>,
) -> Result<()> {
    output::print_header("docweave render");
    let config = super::load_config(config_path)?;

    output::print_step(1, 3, "Loading template...");
    let template = DocxTemplate::load_with(template_path, &config)
        .with_context(|| format!("loading template {}", template_path.display()))?;

    output::print_step(2, 3, "Rendering...");
    let raw = std::fs::read_to_string(data_path)
        .with_context(|| format!("reading data {}", data_path.display()))?;
    let context: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing data {}", data_path.display()))?;
    let rendered = template.render_to_vec(&context)?;

    output::print_step(3, 3, "Writing document...");
    let target = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(template_path, template.extension()));
    let mut writer = BufWriter::new(
        File::create(&target).with_context(|| format!("creating {}", target.display()))?,
    );
    writer.write_all(&rendered)?;
    writer.flush()?;

    output::print_success("Render complete");
    output::print_template(&template);
    output::print_key_value("Output", &target.display().to_string());
    output::print_key_value("Size", &output::format_size(rendered.len()));

    Ok(())
}

/// `reports/case.docx` → `case.out.docx` in the working directory.
fn default_output(template_path: &Path, extension: &str) -> PathBuf {
    let stem = template_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    PathBuf::from(format!("{stem}.out.{extension}"))
}
