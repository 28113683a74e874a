//! Entry-by-entry rewriting of zip containers.
//!
//! [`transform_archive`] walks every entry of a source container in order. Entries
//! selected by the [`EntryTransform`] are re-encoded with the transform's output;
//! every other entry goes through `ZipWriter::raw_copy_file`, so its compressed bytes,
//! CRC and metadata land in the destination untouched.
//!
//! On error the destination is left half-written and must be discarded.

use std::io::{Read, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{DocweaveError, Result};

/// Metadata of one container entry, as seen by a transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    pub name: String,
    pub compression: CompressionMethod,
    /// Uncompressed size as advertised by the container.
    pub size: u64,
    pub is_dir: bool,
}

/// Per-entry rewrite applied by [`transform_archive`].
pub trait EntryTransform {
    /// Whether this entry is rewritten. Unselected entries are copied verbatim.
    fn selects(&self, header: &EntryHeader) -> bool;

    /// Produce the new content of a selected entry.
    fn transform(
        &mut self,
        header: &EntryHeader,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
    ) -> Result<()>;
}

/// Rewrites the single entry called `name` as UTF-8 markup.
///
/// The entry is read in full and handed to `rewrite` together with the output
/// stream. `seen()` reports whether the entry was present.
pub struct MarkupRewrite<'a, F> {
    name: &'a str,
    rewrite: F,
    seen: bool,
}

impl<'a, F> MarkupRewrite<'a, F>
where
    F: FnMut(&str, &mut dyn Write) -> Result<()>,
{
    /// Rewrite the entry called `name` with `rewrite`.
    pub fn new(name: &'a str, rewrite: F) -> Self {
        Self {
            name,
            rewrite,
            seen: false,
        }
    }

    /// Whether the entry turned up during the last [`transform_archive`] run.
    pub fn seen(&self) -> bool {
        self.seen
    }
}

impl<F> EntryTransform for MarkupRewrite<'_, F>
where
    F: FnMut(&str, &mut dyn Write) -> Result<()>,
{
    fn selects(&self, header: &EntryHeader) -> bool {
        !header.is_dir && header.name == self.name
    }

    fn transform(
        &mut self,
        header: &EntryHeader,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
    ) -> Result<()> {
        self.seen = true;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| DocweaveError::EntryRead {
                entry: header.name.clone(),
                source,
            })?;
        let markup = String::from_utf8(bytes).map_err(|_| DocweaveError::InvalidEncoding {
            entry: header.name.clone(),
        })?;
        (self.rewrite)(&markup, writer)
    }
}

/// Copy `source` into `dest`, rewriting the entries `transform` selects.
///
/// Entry order and names are preserved. Rewritten entries keep their compression
/// method and get a fixed 1980-01-01 timestamp so repeated runs produce identical
/// bytes. Returns the finished destination writer.
pub fn transform_archive<R, W, T>(source: R, dest: W, transform: &mut T) -> Result<W>
where
    R: Read + Seek,
    W: Write + Seek,
    T: EntryTransform + ?Sized,
{
    let mut archive = ZipArchive::new(source)?;
    let mut zip = ZipWriter::new(dest);

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let header = EntryHeader {
            name: file.name().to_string(),
            compression: file.compression(),
            size: file.size(),
            is_dir: file.is_dir(),
        };

        if transform.selects(&header) {
            tracing::debug!("rewriting entry {}", header.name);
            let options = SimpleFileOptions::default()
                .compression_method(header.compression)
                .last_modified_time(DateTime::default());
            zip.start_file(header.name.as_str(), options)?;
            transform.transform(&header, &mut file, &mut zip)?;
        } else {
            tracing::trace!("copying entry {}", header.name);
            zip.raw_copy_file(file)?;
        }
    }

    Ok(zip.finish()?)
}
