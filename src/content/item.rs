use super::ProcessError;
use crate::metadata::Meta;
use crate::render::{RenderContext, RenderEnv};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Output filename written for every item.
pub const INDEX_FILE: &str = "index.html";

/// Fields every content variant shares.
#[derive(Debug, Clone)]
pub struct Item {
    pub meta: Meta,
    /// HTML body as converted from markdown. Placeholder tokens are left in
    /// place here and resolved per render.
    pub content: String,
    /// Content root, shared by every item of a build.
    pub src_path: Arc<Path>,
    /// Output root, shared by every item of a build.
    pub build_path: Arc<Path>,
}

impl Item {
    pub fn new(meta: Meta, content: String, src_path: Arc<Path>, build_path: Arc<Path>) -> Self {
        Self {
            meta,
            content,
            src_path,
            build_path,
        }
    }

    /// `<build_path>/<meta.path>`: the directory holding this item's `index.html`.
    pub fn output_dir(&self) -> PathBuf {
        let path = self.meta.path();
        if path.is_empty() {
            self.build_path.to_path_buf()
        } else {
            self.build_path.join(path)
        }
    }

    /// Render `template` against `context` into `<output_dir>/index.html`.
    pub fn render(
        &self,
        env: &RenderEnv<'_>,
        template: &str,
        context: &RenderContext,
    ) -> Result<PathBuf, ProcessError> {
        let html = env.templates.render(template, context)?;

        let dir = self.output_dir();
        fs::create_dir_all(&dir).map_err(|source| ProcessError::Io {
            path: dir.clone(),
            source,
        })?;
        let index = dir.join(INDEX_FILE);
        fs::write(&index, html).map_err(|source| ProcessError::Io {
            path: index.clone(),
            source,
        })?;

        tracing::debug!("wrote {}", index.display());
        Ok(index)
    }
}
