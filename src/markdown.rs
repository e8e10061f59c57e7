//! Markdown conversion: front matter plus HTML body.
//!
//! Source files start with an optional metadata block in the "meta" style:
//!
//! ```text
//! Title: A walk in the hills
//! Date: 2024-06-01
//! Tags: hiking, photos
//! Summary: First line of a long summary
//!     continued on an indented line
//! Status: published
//!
//! The body starts after the first blank line.
//! ```
//!
//! Keys are lower-cased. Every key maps to a list of values: repeated keys
//! and indented continuation lines both append. The block may be wrapped in
//! `---` lines. HTML rendering is pulldown-cmark with options taken from the
//! configured extension list.
//!
//! The converter holds no per-document state, so one instance converts any
//! number of documents without leaking metadata between them.

use crate::config::ConfigError;
use pulldown_cmark::{Options, Parser, html};
use std::collections::BTreeMap;

/// Raw front matter: field name → every value given for it, in order.
pub type RawMeta = BTreeMap<String, Vec<String>>;

/// Output of a single conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub html: String,
    pub meta: RawMeta,
}

#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    options: Options,
}

impl MarkdownConverter {
    /// Build a converter from configured extension names.
    ///
    /// `meta`, `fenced_code` and `codehilite` are accepted for compatibility;
    /// front matter and fenced code are always on.
    pub fn from_extensions(extensions: &[String]) -> Result<Self, ConfigError> {
        let mut options = Options::empty();
        for ext in extensions {
            match ext.as_str() {
                "meta" | "fenced_code" | "codehilite" => {}
                "tables" => options.insert(Options::ENABLE_TABLES),
                "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
                "strikethrough" | "del" => options.insert(Options::ENABLE_STRIKETHROUGH),
                "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
                "smarty" | "smart_punctuation" => options.insert(Options::ENABLE_SMART_PUNCTUATION),
                "math" | "mdx_math" => options.insert(Options::ENABLE_MATH),
                "attr_list" | "heading_attributes" => {
                    options.insert(Options::ENABLE_HEADING_ATTRIBUTES)
                }
                other => {
                    return Err(ConfigError::Validation(format!(
                        "unknown markdown extension: {other}"
                    )));
                }
            }
        }
        Ok(Self { options })
    }

    /// Split front matter off `raw` and render the rest to HTML.
    pub fn convert(&self, raw: &str) -> Converted {
        let (meta, body) = split_front_matter(raw);
        let parser = Parser::new_ext(body, self.options);
        let mut html = String::new();
        html::push_html(&mut html, parser);
        Converted { html, meta }
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TABLES,
        }
    }
}

/// Parse a `Key: value` line. Up to three leading spaces are allowed.
fn meta_line(line: &str) -> Option<(String, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let (key, value) = line[indent..].split_once(':')?;
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid_key.then(|| (key.to_lowercase(), value.trim()))
}

/// Parse a continuation line (four or more leading spaces).
fn continuation_line(line: &str) -> Option<&str> {
    line.starts_with("    ").then(|| line.trim())
}

fn is_delimiter(line: &str, marker: &str) -> bool {
    line.strip_prefix(marker)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Split the metadata block off the top of a document.
///
/// Returns the parsed fields and the remaining body. A document without a
/// metadata block yields an empty map and the whole input as body.
pub fn split_front_matter(raw: &str) -> (RawMeta, &str) {
    let mut meta = RawMeta::new();
    let mut rest = raw;
    let mut current_key: Option<String> = None;
    let mut first = true;

    while !rest.is_empty() {
        let (line, next) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };
        let line = line.trim_end_matches('\r');

        if first && is_delimiter(line, "---") {
            first = false;
            rest = next;
            continue;
        }
        first = false;

        if line.trim().is_empty() || is_delimiter(line, "---") || is_delimiter(line, "...") {
            rest = next;
            break;
        }

        if let Some((key, value)) = meta_line(line) {
            meta.entry(key.clone()).or_default().push(value.to_string());
            current_key = Some(key);
        } else if let (Some(value), Some(key)) = (continuation_line(line), &current_key) {
            meta.entry(key.clone()).or_default().push(value.to_string());
        } else {
            break;
        }
        rest = next;
    }

    (meta, rest)
}
