//! Terminal output formatting for the docweave CLI.
//!
//! Status lines go to stderr so that stdout carries only document content
//! (`docweave preprocess` without `--output`). Colors come from [`console`].

use console::style;

use docweave_core::template::DocumentTemplate;

/// Bold cyan title with a dimmed `=` underline.
pub fn print_header(text: &str) {
    eprintln!("\n{}", style(text).bold().cyan());
    eprintln!("{}", style("=".repeat(text.chars().count())).dim());
}

/// Green `[OK]` line.
pub fn print_success(text: &str) {
    eprintln!("{} {text}", style("[OK]").green().bold());
}

/// Yellow `[WARN]` line.
pub fn print_warning(text: &str) {
    eprintln!("{} {text}", style("[WARN]").yellow().bold());
}

/// `[2/3] Rendering...`
pub fn print_step(step: u32, total: u32, text: &str) {
    eprintln!("{} {text}", style(format!("[{step}/{total}]")).dim());
}

/// Indented `key: value` line with the key dimmed.
pub fn print_key_value(key: &str, value: &str) {
    eprintln!("  {:<10} {value}", style(format!("{key}:")).dim());
}

/// Name, MIME type and extension of a loaded template.
pub fn print_template(template: &dyn DocumentTemplate) {
    print_key_value("Name", template.name());
    print_key_value("Type", template.mime_type());
    print_key_value("Extension", template.extension());
}

/// Human-readable byte count: `512 B`, `18.4 KiB`, `2.1 MiB`.
pub fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}
