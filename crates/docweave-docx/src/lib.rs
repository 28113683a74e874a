//! WordprocessingML (`.docx`) templates for docweave.
//!
//! A `.docx` file is a zip container; the document body lives in `word/document.xml`.
//! [`DocxTemplate::load`] repairs and rewrites that entry once (see [`preprocess`]) and
//! keeps the resulting container in memory. Every [`DocumentTemplate::render`] call then
//! copies the buffered container again, compiling and executing the body as a
//! Handlebars template on the way through. All other entries (styles, media,
//! relationships) are copied byte for byte.
//!
//! ## Directives
//!
//! - `{{ expr }}`: inline Handlebars expression, substituted in place.
//! - `{{p expr}}`: must be the only text of its paragraph. The paragraph is replaced by
//!   `{{ expr }}`, so block helpers can wrap several paragraphs without leaving empty
//!   ones behind.
//! - `{{tr expr}}`: anywhere inside a table row. The whole row is replaced by
//!   `{{ expr }}`, so block helpers can repeat the rows between two marker rows.

pub mod preprocess;

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use zip::ZipArchive;

use docweave_core::archive::{transform_archive, MarkupRewrite};
use docweave_core::config::EngineConfig;
use docweave_core::error::{DocweaveError, Result};
use docweave_core::registry::TemplateRegistry;
use docweave_core::renderer::TemplateRenderer;
use docweave_core::template::DocumentTemplate;

/// Container entry holding the document body.
pub const MAIN_DOCUMENT: &str = "word/document.xml";

/// MIME type reported for rendered documents.
pub const MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File extension handled by [`load_template`], without the dot.
pub const EXTENSION: &str = "docx";

/// A loaded `.docx` template.
///
/// Cloning is cheap: the preprocessed container is shared behind an [`Arc`] and never
/// modified after load.
#[derive(Clone)]
pub struct DocxTemplate {
    name: String,
    source: Arc<[u8]>,
    renderer: TemplateRenderer,
}

impl DocxTemplate {
    /// Load a template from disk with default settings.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, &EngineConfig::default())
    }

    /// Load a template from disk.
    pub fn load_with(path: &Path, config: &EngineConfig) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)?;
        Self::from_reader(name, file, config)
    }

    /// Load a template from an in-memory container.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8], config: &EngineConfig) -> Result<Self> {
        Self::from_reader(name.into(), Cursor::new(bytes), config)
    }

    fn from_reader<R: Read + Seek>(name: String, reader: R, config: &EngineConfig) -> Result<Self> {
        let renderer = TemplateRenderer::from_config(config);

        let mut rewrite = MarkupRewrite::new(MAIN_DOCUMENT, |markup: &str, out: &mut dyn Write| {
            let prepared = preprocess::preprocess(markup);
            // Surface syntax errors at load time rather than on first render.
            renderer.compile(&name, &prepared)?;
            out.write_all(prepared.as_bytes())?;
            Ok(())
        });
        let buffer = transform_archive(reader, Cursor::new(Vec::new()), &mut rewrite)?;
        if !rewrite.seen() {
            return Err(DocweaveError::MissingEntry {
                entry: MAIN_DOCUMENT.to_string(),
            });
        }

        let source: Arc<[u8]> = buffer.into_inner().into();
        tracing::info!("loaded template {name} ({} bytes)", source.len());
        Ok(Self {
            name,
            source,
            renderer,
        })
    }

    /// The preprocessed document body, as it is handed to the template compiler.
    pub fn preprocessed_markup(&self) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(&self.source[..]))?;
        let mut entry = archive.by_name(MAIN_DOCUMENT)?;
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| DocweaveError::EntryRead {
                entry: MAIN_DOCUMENT.to_string(),
                source,
            })?;
        String::from_utf8(bytes).map_err(|_| DocweaveError::InvalidEncoding {
            entry: MAIN_DOCUMENT.to_string(),
        })
    }
}

impl DocumentTemplate for DocxTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    fn extension(&self) -> &'static str {
        EXTENSION
    }

    fn render(&self, output: &mut dyn Write, context: &Value) -> Result<()> {
        let mut rewrite = MarkupRewrite::new(MAIN_DOCUMENT, |markup: &str, out: &mut dyn Write| {
            self.renderer.compile(&self.name, markup)?.render_to(context, out)
        });
        let rendered = transform_archive(
            Cursor::new(&self.source[..]),
            Cursor::new(Vec::new()),
            &mut rewrite,
        )?
        .into_inner();

        output.write_all(&rendered)?;
        tracing::info!("rendered {} ({} bytes)", self.name, rendered.len());
        Ok(())
    }
}

impl fmt::Debug for DocxTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocxTemplate")
            .field("name", &self.name)
            .field("source_len", &self.source.len())
            .field("renderer", &self.renderer)
            .finish()
    }
}

/// Registry loader for `.docx` files.
pub fn load_template(path: &Path, config: &EngineConfig) -> Result<Arc<dyn DocumentTemplate>> {
    Ok(Arc::new(DocxTemplate::load_with(path, config)?))
}

/// Install the `.docx` loader into `registry`.
pub fn register(registry: &mut TemplateRegistry) {
    registry.register_loader(EXTENSION, load_template);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx(body: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(MAIN_DOCUMENT, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_handle_metadata() {
        let tpl = DocxTemplate::from_bytes("report.docx", &docx("<w:body/>"), &EngineConfig::default())
            .unwrap();
        assert_eq!(tpl.name(), "report.docx");
        assert_eq!(tpl.mime_type(), MIME_TYPE);
        assert_eq!(tpl.extension(), "docx");
        assert_eq!(tpl.file_name("20240102 - Case"), "20240102 - Case.docx");
    }

    #[test]
    fn test_preprocessed_markup_is_buffered() {
        let body = "<w:p><w:r><w:t>{</w:t></w:r><w:r><w:t>{ name }}</w:t></w:r></w:p>";
        let tpl = DocxTemplate::from_bytes("a.docx", &docx(body), &EngineConfig::default()).unwrap();
        assert_eq!(
            tpl.preprocessed_markup().unwrap(),
            "<w:p><w:r><w:t>{{ name }}</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_missing_main_document() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("content.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<office:document/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = DocxTemplate::from_bytes("a.odt", &bytes, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, DocweaveError::MissingEntry { .. }));
    }

    #[test]
    fn test_compile_error_at_load() {
        let body = "<w:t>{{#each rows}}</w:t><w:t>{{/if}}</w:t>";
        let err = DocxTemplate::from_bytes("bad.docx", &docx(body), &EngineConfig::default())
            .unwrap_err();
        match err {
            DocweaveError::Compile { template, .. } => assert_eq!(template, "bad.docx"),
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_writes_nothing_on_failure() {
        let tpl = DocxTemplate::from_bytes(
            "a.docx",
            &docx("<w:t>{{ name }}</w:t>"),
            &EngineConfig::default(),
        )
        .unwrap();
        let mut out = Vec::new();
        assert!(tpl.render(&mut out, &json!({})).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_register_loader() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("case.docx"), docx("<w:body/>")).unwrap();
        std::fs::write(dir.path().join("readme.txt"), "skip").unwrap();

        let mut registry = TemplateRegistry::default();
        register(&mut registry);
        assert_eq!(registry.load_dir(dir.path()).unwrap(), 1);
        assert_eq!(registry.get("case.docx").unwrap().mime_type(), MIME_TYPE);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DocxTemplate::load(Path::new("/tmp/nonexistent_docweave.docx")).unwrap_err();
        assert!(matches!(err, DocweaveError::Io(_)));
    }
}
