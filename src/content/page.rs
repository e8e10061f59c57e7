//! Standalone site pages.
//!
//! A page at `content/pages/<name>.md` renders the template named by its
//! `type` field. The page called like the configured `home` lands at the
//! site root; every other page at `<output>/<name>/`.

use super::{Item, Outcome, Process, ProcessError};
use crate::assets::copy_tree;
use crate::naming::{page_output_path, strip_segment};
use crate::render::{RenderContext, RenderEnv, resolve_placeholder};
use std::path::PathBuf;

const DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Page {
    pub item: Item,
    /// Source name with the `pages` segment stripped, e.g. `about`.
    pub name: String,
}

impl Page {
    /// Wrap a parsed item, rewriting `meta.path` to the page's output path.
    pub fn new(mut item: Item, home: &str) -> Self {
        let name = strip_segment(item.meta.path(), "pages");
        item.meta.set_path(page_output_path(&name, home));
        Self { item, name }
    }

    /// Template stem, from the `type` field.
    pub fn kind(&self) -> Result<&str, ProcessError> {
        self.item.meta.kind().ok_or(ProcessError::MissingField("type"))
    }

    fn context(&self, env: &RenderEnv<'_>) -> Result<RenderContext, ProcessError> {
        let mut ctx = env.context();
        ctx.insert("meta", &self.item.meta)?;
        ctx.insert("page", &self.name)?;
        ctx.insert("page_name", self.kind()?)?;
        ctx.insert("path", self.item.meta.path())?;
        ctx.insert(
            "page_content",
            resolve_placeholder(
                &self.item.content,
                &env.config.build_date_template,
                env.build_date,
            ),
        )?;
        Ok(ctx)
    }

    fn render(&self, env: &RenderEnv<'_>) -> Result<PathBuf, ProcessError> {
        let kind = self.kind()?;
        let ctx = self.context(env)?;
        self.item.render(env, kind, &ctx)
    }
}

impl Process for Page {
    fn process(&mut self, env: &RenderEnv<'_>) -> Result<Outcome, ProcessError> {
        Ok(Outcome {
            index: self.render(env)?,
            ..Outcome::default()
        })
    }
}

/// A page with an attached directory of arbitrary files, copied next to its
/// own `index.html`.
///
/// The home page renders at the site root, so its data lands in
/// `<output>/data`, not `<output>/home/data`.
#[derive(Debug, Clone)]
pub struct DataPage {
    pub page: Page,
    /// `content/data/<name>`
    pub from_path: PathBuf,
    /// `<output>/<page output path>/data`
    pub to_path: PathBuf,
}

impl DataPage {
    pub fn new(item: Item, home: &str) -> Self {
        let page = Page::new(item, home);
        let from_path = page.item.src_path.join(DATA_DIR).join(&page.name);
        let to_path = page.item.output_dir().join(DATA_DIR);
        Self {
            page,
            from_path,
            to_path,
        }
    }
}

impl Process for DataPage {
    fn process(&mut self, env: &RenderEnv<'_>) -> Result<Outcome, ProcessError> {
        let data_files = copy_tree(&self.from_path, &self.to_path)?;
        Ok(Outcome {
            index: self.page.render(env)?,
            data_files,
            ..Outcome::default()
        })
    }
}
