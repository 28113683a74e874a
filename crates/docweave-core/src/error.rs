//! Unified error types for docweave.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while loading or rendering a document template.
#[derive(Error, Debug)]
pub enum DocweaveError {
    // --- Configuration ---

    /// The configuration file (`docweave.config.json`) was not found or could not be read.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Container ---

    /// The container could not be parsed as a zip archive.
    #[error("invalid document container: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An entry's data could not be decoded (corrupt deflate stream, CRC mismatch).
    #[error("failed to read entry '{entry}'")]
    EntryRead {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    /// The container has no entry holding the primary document markup.
    #[error("document container has no '{entry}' entry")]
    MissingEntry { entry: String },

    /// The primary markup entry is not valid UTF-8.
    #[error("entry '{entry}' is not valid UTF-8")]
    InvalidEncoding { entry: String },

    // --- Templates ---

    /// The preprocessed markup does not parse as Handlebars source.
    #[error("template '{template}' failed to compile: {message}")]
    Compile { template: String, message: String },

    /// The data context does not satisfy an expression (missing field, bad iteration target).
    #[error("template '{template}' failed to render: {message}")]
    Render { template: String, message: String },

    // --- Registry ---

    /// No loader is registered for the file extension.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The registry holds no template with this name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    // --- General ---

    /// A filesystem or output stream I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse error class, for callers that map failures onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source file missing or unreadable, output write failure.
    Io,
    /// Container unparseable, entry unreadable or malformed.
    Format,
    /// Markup did not compile as template source.
    Compile,
    /// Data context did not satisfy the template.
    Render,
    /// Configuration missing or invalid.
    Config,
    /// Unknown template name or format.
    Lookup,
}

impl DocweaveError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => ErrorKind::Config,
            Self::Archive(zip::result::ZipError::Io(_)) => ErrorKind::Io,
            Self::Archive(_)
            | Self::EntryRead { .. }
            | Self::MissingEntry { .. }
            | Self::InvalidEncoding { .. } => ErrorKind::Format,
            Self::Compile { .. } => ErrorKind::Compile,
            Self::Render { .. } => ErrorKind::Render,
            Self::UnsupportedFormat(_) | Self::TemplateNotFound(_) => ErrorKind::Lookup,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Alias for `Result<T, DocweaveError>`.
pub type Result<T> = std::result::Result<T, DocweaveError>;
