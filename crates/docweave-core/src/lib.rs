//! Core library for docweave.
//!
//! Provides the [`template::DocumentTemplate`] trait that every document format
//! implements, along with the shared machinery: zip container rewriting, Handlebars
//! compilation and rendering, configuration loading, and the template registry.
//!
//! This crate is format-agnostic. Concrete formats live in their own crates:
//! - [`docweave_docx`](https://docs.rs/docweave-docx): WordprocessingML (`.docx`)

pub mod archive;
pub mod config;
pub mod error;
pub mod registry;
pub mod renderer;
pub mod template;

pub use error::{DocweaveError, ErrorKind, Result};
pub use template::DocumentTemplate;
