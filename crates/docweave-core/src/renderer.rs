//! Handlebars-based compiler and renderer for preprocessed document markup.
//!
//! Wraps the [`handlebars::Handlebars`] engine with **strict mode** enabled by default.
//! Strict mode means any `{{field}}` referenced in the markup must be present in the
//! data context, otherwise rendering fails. This includes the condition of `#if` and
//! `#unless`, which stock Handlebars treats as false when the field is absent.
//!
//! Compilation and execution are separate steps so the two failure classes stay
//! distinct: [`TemplateRenderer::compile`] yields [`DocweaveError::Compile`] and
//! [`CompiledTemplate::render_to`] yields [`DocweaveError::Render`].
//!
//! Nothing is cached. Each [`TemplateRenderer::compile`] builds a fresh registry.
//!
//! ## Usage
//!
//! ```ignore
//! let renderer = TemplateRenderer::new();
//! let compiled = renderer.compile("word/document.xml", "<w:t>{{ name }}</w:t>")?;
//! compiled.render_to(&serde_json::json!({ "name": "Alice" }), &mut out)?;
//! ```

use std::io::Write;
use std::sync::LazyLock;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, JsonTruthy, Output, RenderContext,
    RenderErrorReason, Renderable,
};
use regex::Regex;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::{DocweaveError, Result};

/// Whitespace between `{{` and a block sigil, as left behind by directive collapsing.
static LOOSE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(~?)\s+([#/^!>]|else\b)").expect("BUG: invalid LOOSE_BLOCK_RE regex literal"));

/// `if` / `unless` that fail on a missing condition instead of taking the inverse branch.
#[derive(Clone, Copy)]
struct StrictConditional {
    name: &'static str,
    positive: bool,
}

impl HelperDef for StrictConditional {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let param = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(self.name, 0))?;
        if param.is_value_missing() {
            return Err(RenderErrorReason::MissingVariable(param.relative_path().cloned()).into());
        }

        let include_zero = h
            .hash_get("includeZero")
            .and_then(|v| v.value().as_bool())
            .unwrap_or(false);
        let branch = if param.value().is_truthy(include_zero) == self.positive {
            h.template()
        } else {
            h.inverse()
        };
        match branch {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

/// Template compiler with a fixed engine configuration.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    strict: bool,
}

/// A template ready to execute against a data context.
pub struct CompiledTemplate {
    name: String,
    hbs: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a new renderer with strict mode enabled.
    pub fn new() -> Self {
        Self { strict: true }
    }

    /// Create a renderer from engine settings.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            strict: config.strict_mode,
        }
    }

    /// Compile `source` as a Handlebars template named `name`.
    pub fn compile(&self, name: &str, source: &str) -> Result<CompiledTemplate> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(self.strict);
        if self.strict {
            hbs.register_helper(
                "if",
                Box::new(StrictConditional {
                    name: "if",
                    positive: true,
                }),
            );
            hbs.register_helper(
                "unless",
                Box::new(StrictConditional {
                    name: "unless",
                    positive: false,
                }),
            );
        }

        let source = tighten_block_markers(source);
        hbs.register_template_string(name, &*source)
            .map_err(|e| DocweaveError::Compile {
                template: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(CompiledTemplate {
            name: name.to_string(),
            hbs,
        })
    }

    /// Compile and execute in one step, writing the output to `writer`.
    pub fn render(
        &self,
        name: &str,
        source: &str,
        data: &Value,
        writer: &mut dyn Write,
    ) -> Result<()> {
        self.compile(name, source)?.render_to(data, writer)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompiledTemplate {
    /// Name the template was compiled under; used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the template against `data`, writing the output to `writer`.
    pub fn render_to(&self, data: &Value, writer: &mut dyn Write) -> Result<()> {
        self.hbs
            .render_to_write(&self.name, data, writer)
            .map_err(|e| DocweaveError::Render {
                template: self.name.clone(),
                message: e.to_string(),
            })
    }

    /// Execute the template against `data` into a string.
    pub fn render_to_string(&self, data: &Value) -> Result<String> {
        self.hbs
            .render(&self.name, data)
            .map_err(|e| DocweaveError::Render {
                template: self.name.clone(),
                message: e.to_string(),
            })
    }
}

/// Turn `{{ #each rows }}` into `{{#each rows }}`.
///
/// Block sigils are moved up against the opening braces (or a `~` whitespace control)
/// so collapsed row and paragraph directives parse as block helpers.
fn tighten_block_markers(source: &str) -> std::borrow::Cow<'_, str> {
    LOOSE_BLOCK_RE.replace_all(source, "{{${1}${2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_interpolation() {
        let renderer = TemplateRenderer::new();
        let out = renderer
            .compile("doc", "<w:t>{{ name }}</w:t>")
            .unwrap()
            .render_to_string(&json!({ "name": "Alice" }))
            .unwrap();
        assert_eq!(out, "<w:t>Alice</w:t>");
    }

    #[test]
    fn test_values_are_xml_escaped() {
        let renderer = TemplateRenderer::new();
        let out = renderer
            .compile("doc", "<w:t>{{ title }}</w:t>")
            .unwrap()
            .render_to_string(&json!({ "title": "R&D <draft>" }))
            .unwrap();
        assert_eq!(out, "<w:t>R&amp;D &lt;draft&gt;</w:t>");
    }

    #[test]
    fn test_loose_block_markers_compile() {
        let renderer = TemplateRenderer::new();
        let source = "{{ #each rows }}<w:t>{{ this }}</w:t>{{ /each }}";
        let out = renderer
            .compile("doc", source)
            .unwrap()
            .render_to_string(&json!({ "rows": ["a", "b"] }))
            .unwrap();
        assert_eq!(out, "<w:t>a</w:t><w:t>b</w:t>");
    }

    #[test]
    fn test_loose_else_compiles() {
        let renderer = TemplateRenderer::new();
        let source = "{{ #if ok }}yes{{ else }}no{{ /if }}";
        let compiled = renderer.compile("doc", source).unwrap();
        assert_eq!(compiled.render_to_string(&json!({ "ok": true })).unwrap(), "yes");
        assert_eq!(compiled.render_to_string(&json!({ "ok": false })).unwrap(), "no");
    }

    #[test]
    fn test_tighten_leaves_plain_expressions() {
        assert_eq!(tighten_block_markers("{{ name }}"), "{{ name }}");
        assert_eq!(tighten_block_markers("{{~ #if x}}"), "{{~#if x}}");
        assert_eq!(tighten_block_markers("{{ elsewhere }}"), "{{ elsewhere }}");
    }

    #[test]
    fn test_unbalanced_block_is_compile_error() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .compile("word/document.xml", "{{#each rows}}<w:t/>{{/if}}")
            .err()
            .unwrap();
        match err {
            DocweaveError::Compile { template, .. } => assert_eq!(template, "word/document.xml"),
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_mode_missing_field() {
        let renderer = TemplateRenderer::new();
        let compiled = renderer.compile("doc", "{{ missing_field }}").unwrap();
        let err = compiled.render_to_string(&json!({})).unwrap_err();
        assert!(matches!(err, DocweaveError::Render { .. }));
    }

    #[test]
    fn test_strict_mode_missing_condition() {
        let renderer = TemplateRenderer::new();
        for source in [
            "{{#if show}}<w:p/>{{/if}}",
            "{{#unless show}}<w:p/>{{/unless}}",
            "{{#if show}}a{{else}}b{{/if}}",
        ] {
            let compiled = renderer.compile("doc", source).unwrap();
            match compiled.render_to_string(&json!({})).unwrap_err() {
                DocweaveError::Render { message, .. } => assert!(message.contains("show")),
                other => panic!("expected render error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_strict_mode_present_conditions() {
        let renderer = TemplateRenderer::new();
        let compiled = renderer
            .compile("doc", "{{#if show}}a{{else}}b{{/if}}{{#unless show}}c{{/unless}}")
            .unwrap();
        assert_eq!(compiled.render_to_string(&json!({ "show": true })).unwrap(), "a");
        assert_eq!(compiled.render_to_string(&json!({ "show": false })).unwrap(), "bc");
        assert_eq!(compiled.render_to_string(&json!({ "show": null })).unwrap(), "bc");

        let compiled = renderer
            .compile("doc", "{{#if n includeZero=true}}zero{{/if}}")
            .unwrap();
        assert_eq!(compiled.render_to_string(&json!({ "n": 0 })).unwrap(), "zero");
    }

    #[test]
    fn test_lenient_mode_missing_condition_is_false() {
        let config = EngineConfig {
            strict_mode: false,
            ..EngineConfig::default()
        };
        let out = TemplateRenderer::from_config(&config)
            .compile("doc", "[{{#if show}}a{{else}}b{{/if}}]")
            .unwrap()
            .render_to_string(&json!({}))
            .unwrap();
        assert_eq!(out, "[b]");
    }

    #[test]
    fn test_lenient_mode_renders_empty() {
        let config = EngineConfig {
            strict_mode: false,
            ..EngineConfig::default()
        };
        let renderer = TemplateRenderer::from_config(&config);
        let out = renderer
            .compile("doc", "[{{ missing_field }}]")
            .unwrap()
            .render_to_string(&json!({}))
            .unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_render_writes_to_stream() {
        let renderer = TemplateRenderer::new();
        let mut out = Vec::new();
        renderer
            .render("doc", "{{ a }}-{{ b }}", &json!({ "a": 1, "b": "two" }), &mut out)
            .unwrap();
        assert_eq!(out, b"1-two");
    }
}
