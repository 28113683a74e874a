//! The format-neutral template handle.
//!
//! Each container format (`.docx` today) provides one [`DocumentTemplate`]
//! implementation; the registry and the CLI only ever see `dyn DocumentTemplate`.

use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::error::Result;

/// Every document format variant implements this trait.
///
/// A handle is immutable once loaded, so one instance may serve concurrent
/// [`render`](DocumentTemplate::render) calls from several threads.
pub trait DocumentTemplate: Send + Sync {
    /// Display name, derived from the source file name.
    fn name(&self) -> &str;

    /// MIME type of the rendered document.
    fn mime_type(&self) -> &'static str;

    /// Canonical file extension, without the leading dot.
    fn extension(&self) -> &'static str;

    /// Render the template against `context` and write the finished document to `output`.
    ///
    /// Nothing is written to `output` unless the whole document rendered successfully.
    fn render(&self, output: &mut dyn Write, context: &Value) -> Result<()>;

    /// Render into a fresh buffer.
    fn render_to_vec(&self, context: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.render(&mut out, context)?;
        Ok(out)
    }

    /// Download file name for a rendered document titled `title`.
    ///
    /// Characters that would break a path or a `Content-Disposition` header are
    /// replaced with `_`. A blank title falls back to the stem of [`name`](Self::name).
    fn file_name(&self, title: &str) -> String {
        let mut stem = sanitize_stem(title);
        if stem.is_empty() {
            let fallback = Path::new(self.name())
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            stem = sanitize_stem(fallback);
        }
        if stem.is_empty() {
            stem = "document".to_string();
        }
        format!("{stem}.{}", self.extension())
    }
}

fn sanitize_stem(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
