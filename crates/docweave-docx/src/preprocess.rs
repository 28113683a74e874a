//! Markup repair for WordprocessingML before it is compiled as a template.
//!
//! Word splits typed text into runs whenever formatting, spell-check or revision
//! tracking changes, so a directive typed as `{{ name }}` is often stored as
//! `{</w:t></w:r><w:r><w:t>{ name }}` or worse. [`preprocess`] turns the document
//! body back into something Handlebars can compile by running five passes in a
//! fixed order. Each pass relies on the previous ones:
//!
//! 1. [`repair_delimiters`]: drop markup wedged inside `{{`, `{%`, `{#` and their closers.
//! 2. [`repair_interiors`]: drop markup inside a directive's expression.
//! 3. [`collapse_paragraphs`]: `<w:p>{{p EXPR}}</w:p>` becomes `{{ EXPR }}`.
//! 4. [`collapse_rows`]: a `<w:tr>` holding `{{tr EXPR}}` becomes `{{ EXPR }}`.
//! 5. [`normalize_entities`]: XML entities and typographic quotes inside `{{…}}`
//!    become plain ASCII.
//!
//! Directive spans never cross a line break. Word writes the document body on a
//! single line, so this only matters for hand-edited markup.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Markup between the two characters of an opening delimiter: `{<…>{`, `{<…>%`, `{<…>#`.
static SPLIT_OPENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{((?:<[^>]*>)+)([{%#])").expect("BUG: invalid SPLIT_OPENER_RE regex literal")
});

/// Markup between the two characters of a closing delimiter: `}<…>}`, `%<…>}`, `#<…>}`.
static SPLIT_CLOSER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([%}#])((?:<[^>]*>)+)\}").expect("BUG: invalid SPLIT_CLOSER_RE regex literal")
});

/// A complete directive span, up to its first closer.
static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%.*?%\}|\{#.*?#\}|\{\{.*?\}\}").expect("BUG: invalid SPAN_RE regex literal")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("BUG: invalid TAG_RE regex literal"));

/// A `<w:p>` element. Excludes `<w:pPr>` and self-closing `<w:p/>`.
static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:p(?:\s+[^>]*[^/>])?\s*>(.*?)</w:p>")
        .expect("BUG: invalid PARAGRAPH_RE regex literal")
});

static PARAGRAPH_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\{p ([^}]+)\}\}$").expect("BUG: invalid PARAGRAPH_DIRECTIVE_RE regex literal")
});

/// A `<w:tr>` element. Excludes `<w:trPr>` and friends.
static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:tr(?:\s+[^>]*[^/>])?\s*>.*?</w:tr>")
        .expect("BUG: invalid ROW_RE regex literal")
});

static ROW_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{tr ([^}]+)\}\}").expect("BUG: invalid ROW_DIRECTIVE_RE regex literal")
});

static EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{[^}]+\}\}").expect("BUG: invalid EXPRESSION_RE regex literal")
});

const ENTITY_REPLACEMENTS: [(&str, &str); 7] = [
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("\u{201c}", "\""),
    ("\u{201d}", "\""),
    ("\u{2018}", "'"),
    ("\u{2019}", "'"),
];

/// Run all passes over the document body.
pub fn preprocess(xml: &str) -> String {
    let xml = repair_delimiters(xml);
    let xml = repair_interiors(&xml);
    let xml = collapse_paragraphs(&xml);
    let xml = collapse_rows(&xml);
    normalize_entities(&xml)
}

/// Remove markup that splits a two-character delimiter.
///
/// Applied until nothing changes, so a brace run split twice (`{<a>{<b>{`) is joined
/// completely.
pub fn repair_delimiters(xml: &str) -> String {
    let mut current = xml.to_string();
    loop {
        let opened = SPLIT_OPENER_RE.replace_all(&current, "{${2}").into_owned();
        let closed = SPLIT_CLOSER_RE.replace_all(&opened, "${1}}").into_owned();
        if closed == current {
            return closed;
        }
        current = closed;
    }
}

/// Remove every tag inside a directive span, stopping at the span's first closer.
pub fn repair_interiors(xml: &str) -> String {
    SPAN_RE
        .replace_all(xml, |caps: &Captures| TAG_RE.replace_all(&caps[0], "").into_owned())
        .into_owned()
}

/// Replace each paragraph whose whole text is one `{{p EXPR}}` with `{{ EXPR }}`.
///
/// Whitespace around the directive is tolerated; any other text keeps the paragraph
/// as it is.
pub fn collapse_paragraphs(xml: &str) -> String {
    PARAGRAPH_RE
        .replace_all(xml, |caps: &Captures| {
            let text = TAG_RE.replace_all(&caps[1], "");
            match PARAGRAPH_DIRECTIVE_RE.captures(text.trim()) {
                Some(directive) => bare_directive(&directive[1]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Replace each table row containing `{{tr EXPR}}` with `{{ EXPR }}`.
///
/// Everything else in the row is dropped. Only the first `{{tr …}}` of a row counts.
pub fn collapse_rows(xml: &str) -> String {
    ROW_RE
        .replace_all(xml, |caps: &Captures| {
            match ROW_DIRECTIVE_RE.captures(&caps[0]) {
                Some(directive) => bare_directive(&directive[1]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Decode `&quot;`, `&lt;`, `&gt;` and curly quotes inside `{{…}}` spans.
pub fn normalize_entities(xml: &str) -> String {
    EXPRESSION_RE
        .replace_all(xml, |caps: &Captures| {
            ENTITY_REPLACEMENTS
                .iter()
                .fold(caps[0].to_string(), |expr, (from, to)| expr.replace(from, to))
        })
        .into_owned()
}

fn bare_directive(expr: &str) -> String {
    format!("{{{{ {} }}}}", expr.trim())
}
