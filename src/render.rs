//! Template rendering.
//!
//! Templates live in `<theme_path>/templates` and are loaded once per build
//! into a minijinja [`Environment`]. Each file is registered under its full
//! name, so `{% extends "base.html" %}` works, and indexed by its stem (the
//! part before the first `.`), which is what items ask for: posts render
//! `article`, pages render whatever their `type` says.
//!
//! Every render gets its own [`RenderContext`], cloned from the base context
//! the assembler builds after discovery and then overlaid with item fields.
//! The base itself is never written to during processing.
//!
//! Auto-escaping is off: item bodies are already HTML.

use crate::config::{Menu, SiteConfig};
use crate::imaging::ImageBackend;
use crate::metadata::Taxonomy;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template directory not found: {}", .0.display())]
    DirNotFound(PathBuf),
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("template {name} failed to parse: {source}")]
    Syntax {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("template {name} failed to render: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("context value not serializable: {0}")]
    Context(#[from] serde_json::Error),
}

/// The loaded template directory.
pub struct TemplateSet {
    env: Environment<'static>,
    /// stem → registered filename
    stems: BTreeMap<String, String>,
}

impl std::fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateSet")
            .field("stems", &self.stems)
            .finish_non_exhaustive()
    }
}

/// Stem used to look a template up: `article.html` → `article`.
fn template_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

impl TemplateSet {
    /// Load every `*.html*` file in `dir` (not recursive).
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        if !dir.is_dir() {
            return Err(TemplateError::DirNotFound(dir.to_path_buf()));
        }
        let io_err = |source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut sources = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type().map_err(io_err)?.is_file() || !name.contains(".html") {
                continue;
            }
            let path = entry.path();
            let source = fs::read_to_string(&path)
                .map_err(|source| TemplateError::Io { path, source })?;
            sources.push((name, source));
        }
        sources.sort();

        let set = Self::from_sources(sources)?;
        tracing::debug!("loaded {} templates from {}", set.stems.len(), dir.display());
        Ok(set)
    }

    /// Build a set from `(filename, source)` pairs. The first file wins a stem.
    pub fn from_sources(
        sources: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        let mut stems = BTreeMap::new();
        for (name, source) in sources {
            stems
                .entry(template_stem(&name).to_string())
                .or_insert_with(|| name.clone());
            env.add_template_owned(name.clone(), source)
                .map_err(|source| TemplateError::Syntax { name, source })?;
        }
        Ok(Self { env, stems })
    }

    pub fn contains(&self, stem: &str) -> bool {
        self.stems.contains_key(stem)
    }

    pub fn stems(&self) -> impl Iterator<Item = &str> {
        self.stems.keys().map(String::as_str)
    }

    /// Render the template registered under `stem`.
    pub fn render(&self, stem: &str, context: &RenderContext) -> Result<String, TemplateError> {
        let name = self
            .stems
            .get(stem)
            .ok_or_else(|| TemplateError::NotFound(stem.to_string()))?;
        let render_err = |source| TemplateError::Render {
            name: name.clone(),
            source,
        };
        self.env
            .get_template(name)
            .map_err(render_err)?
            .render(context)
            .map_err(render_err)
    }
}

/// Key/value context handed to a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext(Map<String, Value>);

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any previous value.
    pub fn insert(&mut self, key: &str, value: impl Serialize) -> Result<(), TemplateError> {
        self.0.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Base context shared by every render of one build.
    ///
    /// Holds every config key plus `build_date`, `tags`, `categories`,
    /// `menuitems` (the built menu, not the seed) and `js_menu`.
    pub fn base(
        config: &SiteConfig,
        build_date: &str,
        taxonomy: &Taxonomy,
        menu: &Menu,
    ) -> Result<Self, TemplateError> {
        let mut context = match serde_json::to_value(config)? {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        };
        context.insert("build_date", build_date)?;
        context.insert("tags", &taxonomy.tags)?;
        context.insert("categories", &taxonomy.categories)?;
        context.insert("menuitems", menu)?;
        context.insert("js_menu", menu.names())?;
        Ok(context)
    }
}

/// Replace every literal occurrence of `token` in `content`.
///
/// Used to resolve `post_url` and `build_date` tokens while a context is
/// being built; the item's stored content is left as authored. Tokens inside
/// link targets reach the HTML with `{`/`}` percent-encoded, so that form is
/// replaced too.
pub fn resolve_placeholder(content: &str, token: &str, value: &str) -> String {
    if token.is_empty() {
        return content.to_string();
    }
    let encoded = token.replace('{', "%7B").replace('}', "%7D");
    content.replace(token, value).replace(&encoded, value)
}

/// Everything an item needs while it processes itself.
pub struct RenderEnv<'a> {
    pub templates: &'a TemplateSet,
    pub base: &'a RenderContext,
    pub config: &'a SiteConfig,
    /// Snapshot taken once per build, `YYYY-MM-DD`.
    pub build_date: &'a str,
    pub backend: &'a dyn ImageBackend,
}

impl RenderEnv<'_> {
    /// A fresh context for one item.
    pub fn context(&self) -> RenderContext {
        self.base.clone()
    }
}
