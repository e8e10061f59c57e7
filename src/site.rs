//! Site assembly: the build pipeline.
//!
//! ```text
//! config.json ─► SiteAssembler
//!                 1. sync_remote         (optional, remote_bucket)
//!                 2. define_environment  theme/templates → TemplateSet
//!                 3. find_and_parse      content/posts/**/*.md → posts
//!                 4. find_and_parse      content/pages/**/*.md → pages
//!                 5. build_menu          seed + every page
//!                 6. process(posts)      published only → posts/<stem>/index.html
//!                 7. process(pages)      all, with `articles` → <page>/index.html
//! ```
//!
//! Any failure aborts the build. Output already written stays on disk.
//!
//! Discovery is the only phase that touches shared state: it folds every
//! item's tags and category into the [`Taxonomy`]. Processing hands each item
//! a context cloned from an immutable base.

use crate::config::{CONFIG_FILE, ConfigError, Menu, SiteConfig, load_config};
use crate::content::{
    ContentItem, Item, ItemType, NotImplementedError, Outcome, Process, ProcessError, Variant,
    classify,
};
use crate::imaging::{ImageBackend, RustBackend};
use crate::markdown::MarkdownConverter;
use crate::metadata::{DATE_FORMAT, FormatError, Meta, Taxonomy, normalize};
use crate::naming::item_path;
use crate::render::{RenderContext, RenderEnv, TemplateError, TemplateSet};
use crate::sync::{DirectoryStore, SyncError, sync_objects};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of content source files.
const SOURCE_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Template(#[from] TemplateError),
    #[error("remote sync failed: {0}")]
    Sync(#[from] SyncError),
    #[error("{0}")]
    NotImplemented(#[from] NotImplementedError),
    #[error("no {item_type} found in {}", dir.display())]
    NoContent { item_type: ItemType, dir: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk content tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{}: {source}", file.display())]
    Format {
        file: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("{item}: {source}")]
    Item {
        item: String,
        #[source]
        source: ProcessError,
    },
    #[error("template environment not defined; call define_environment first")]
    EnvironmentNotDefined,
}

/// One written item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Source filename relative to its collection, e.g. `hike.md`.
    pub name: String,
    pub variant: Variant,
    pub outcome: Outcome,
}

/// Result of one processing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub rendered: Vec<Rendered>,
    /// Posts left out because they are not published.
    pub skipped: Vec<String>,
}

impl PassSummary {
    pub fn images(&self) -> usize {
        self.rendered.iter().map(|r| r.outcome.images).sum()
    }

    pub fn thumbnails(&self) -> usize {
        self.rendered.iter().map(|r| r.outcome.thumbnails).sum()
    }

    pub fn data_files(&self) -> usize {
        self.rendered.iter().map(|r| r.outcome.data_files).sum()
    }
}

/// Result of a full build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub build_date: String,
    pub synced: usize,
    pub posts: PassSummary,
    pub pages: PassSummary,
}

/// What templates see for each entry of `pages` and `all_posts`.
#[derive(Serialize)]
struct ItemView<'a> {
    meta: &'a Meta,
    content: &'a str,
}

/// Orchestrates one build. Create it, call [`build`](Self::build), drop it.
pub struct SiteAssembler {
    config: SiteConfig,
    /// Directory of `config.json`; relative config paths were resolved here.
    root: PathBuf,
    build_date: NaiveDate,
    converter: MarkdownConverter,
    backend: Box<dyn ImageBackend>,
    templates: Option<TemplateSet>,
    posts: BTreeMap<String, ContentItem>,
    pages: BTreeMap<String, ContentItem>,
    menu: Menu,
    taxonomy: Taxonomy,
}

impl SiteAssembler {
    /// Load `config.json` and snapshot today's date as the build date.
    pub fn from_config_file(path: &Path) -> Result<Self, BuildError> {
        let config = load_config(path)?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        Self::new(config, root, chrono::Local::now().date_naive())
    }

    /// Look for `config.json` in `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, BuildError> {
        Self::from_config_file(&dir.join(CONFIG_FILE))
    }

    /// Build an assembler from an already loaded config.
    ///
    /// Relative paths in `config` are resolved against `root`.
    pub fn new(
        mut config: SiteConfig,
        root: PathBuf,
        build_date: NaiveDate,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        config.src_path = root.join(&config.src_path);
        config.build_path = root.join(&config.build_path);
        config.theme_path = root.join(&config.theme_path);
        let converter = MarkdownConverter::from_extensions(&config.markdown_extensions)?;
        let menu = config.menuitems.clone();

        Ok(Self {
            config,
            root,
            build_date,
            converter,
            backend: Box::new(RustBackend::new()),
            templates: None,
            posts: BTreeMap::new(),
            pages: BTreeMap::new(),
            menu,
            taxonomy: Taxonomy::default(),
        })
    }

    /// Swap the image backend.
    pub fn with_backend(mut self, backend: Box<dyn ImageBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn build_date(&self) -> String {
        self.build_date.format(DATE_FORMAT).to_string()
    }

    pub fn posts(&self) -> &BTreeMap<String, ContentItem> {
        &self.posts
    }

    pub fn pages(&self) -> &BTreeMap<String, ContentItem> {
        &self.pages
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn templates(&self) -> Option<&TemplateSet> {
        self.templates.as_ref()
    }

    /// Run the whole pipeline.
    pub fn build(&mut self) -> Result<BuildSummary, BuildError> {
        let synced = self.sync_remote()?;
        self.define_environment()?;
        self.find_and_parse(ItemType::Posts)?;
        self.find_and_parse(ItemType::Pages)?;
        self.build_menu();
        let posts = self.process(ItemType::Posts)?;
        let pages = self.process(ItemType::Pages)?;

        tracing::info!(
            "built {} posts and {} pages into {}",
            posts.rendered.len(),
            pages.rendered.len(),
            self.config.build_path.display()
        );

        Ok(BuildSummary {
            output: self.config.build_path.clone(),
            build_date: self.build_date(),
            synced,
            posts,
            pages,
        })
    }

    /// Everything up to processing: templates, discovery, menu.
    pub fn check(&mut self) -> Result<(), BuildError> {
        self.define_environment()?;
        self.find_and_parse(ItemType::Posts)?;
        self.find_and_parse(ItemType::Pages)?;
        self.build_menu();
        Ok(())
    }

    /// Pull the configured remote bucket into the site root.
    ///
    /// Returns the number of objects fetched; zero if no bucket is set.
    pub fn sync_remote(&self) -> Result<usize, BuildError> {
        let Some(bucket) = &self.config.remote_bucket else {
            return Ok(0);
        };
        let store = DirectoryStore::open(self.root.join(bucket))?;
        let fetched = sync_objects(&store, &self.root)?;
        tracing::info!("synced {} objects from {}", fetched, bucket);
        Ok(fetched)
    }

    /// Load `<theme_path>/templates`.
    pub fn define_environment(&mut self) -> Result<(), BuildError> {
        let dir = self.config.theme_path.join("templates");
        self.templates = Some(TemplateSet::load(&dir)?);
        Ok(())
    }

    /// Discover, parse and classify every source file of one collection.
    ///
    /// Returns how many items were found. An empty or missing collection
    /// directory is an error.
    pub fn find_and_parse(&mut self, item_type: ItemType) -> Result<usize, BuildError> {
        let dir = self.config.src_path.join(item_type.dir_name());
        let files = discover(&dir)?;
        if files.is_empty() {
            return Err(BuildError::NoContent { item_type, dir });
        }

        let src_path: Arc<Path> = Arc::from(self.config.src_path.as_path());
        let build_path: Arc<Path> = Arc::from(self.config.build_path.as_path());

        for file in &files {
            let raw = fs::read_to_string(file).map_err(|source| BuildError::Read {
                path: file.clone(),
                source,
            })?;
            let converted = self.converter.convert(&raw);
            let normalized = normalize(converted.meta).map_err(|source| BuildError::Format {
                file: file.clone(),
                source,
            })?;
            self.taxonomy.absorb(&normalized);

            let mut meta = normalized.meta;
            meta.set_path(item_path(&self.config.src_path, file).unwrap_or_default());
            let variant = classify(item_type, &meta);
            let item = Item::new(meta, converted.html, src_path.clone(), build_path.clone());

            let key = collection_key(&dir, file);
            tracing::debug!("{} {} → {}", item_type, key, variant);
            let entry = ContentItem::new(variant, item, &self.config);
            match item_type {
                ItemType::Posts => self.posts.insert(key, entry),
                ItemType::Pages => self.pages.insert(key, entry),
            };
        }

        tracing::info!("found {} {}", files.len(), item_type);
        Ok(files.len())
    }

    /// Extend the menu seed with every discovered page, keeping seed order.
    pub fn build_menu(&mut self) {
        for name in self.pages.values().filter_map(ContentItem::page_name) {
            if self.menu.insert_missing(name, name) {
                tracing::debug!("menu += {}", name);
            }
        }
    }

    /// Published posts, newest first. Undated posts go last; ties keep
    /// discovery order.
    pub fn published_index(&self) -> Vec<&Meta> {
        published_index(self.posts.values().map(ContentItem::meta))
    }

    /// Process one collection.
    ///
    /// Posts: only published ones. Pages: all of them, with `articles`,
    /// `pages` and `all_posts` added to the shared context.
    pub fn process(&mut self, item_type: ItemType) -> Result<PassSummary, BuildError> {
        let templates = self
            .templates
            .as_ref()
            .ok_or(BuildError::EnvironmentNotDefined)?;
        let build_date = self.build_date.format(DATE_FORMAT).to_string();
        let mut base = RenderContext::base(&self.config, &build_date, &self.taxonomy, &self.menu)?;

        if item_type == ItemType::Pages {
            base.insert("articles", self.published_index())?;
            base.insert("pages", views(&self.pages))?;
            base.insert("all_posts", views(&self.posts))?;
        }

        let env = RenderEnv {
            templates,
            base: &base,
            config: &self.config,
            build_date: &build_date,
            backend: self.backend.as_ref(),
        };

        let collection = match item_type {
            ItemType::Posts => &mut self.posts,
            ItemType::Pages => &mut self.pages,
        };

        let mut summary = PassSummary::default();
        for (name, item) in collection.iter_mut() {
            if item_type == ItemType::Posts && !item.meta().status().is_published() {
                tracing::debug!("skipping unpublished post {}", name);
                summary.skipped.push(name.clone());
                continue;
            }

            let outcome = item.process(&env).map_err(|source| BuildError::Item {
                item: format!("{}/{}", item_type, name),
                source,
            })?;
            tracing::info!("{} {} → {}", item.variant(), name, outcome.index.display());
            summary.rendered.push(Rendered {
                name: name.clone(),
                variant: item.variant(),
                outcome,
            });
        }

        Ok(summary)
    }
}

/// Every `*.md` file under `dir`, sorted by path. A missing dir yields none.
fn discover(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let is_source = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == SOURCE_EXTENSION);
        if is_source {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Key of a source file within its collection: `hike.md`, `2024/trip.md`.
fn collection_key(dir: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(dir).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn views(items: &BTreeMap<String, ContentItem>) -> BTreeMap<&str, ItemView<'_>> {
    items
        .iter()
        .map(|(name, item)| {
            (
                name.as_str(),
                ItemView {
                    meta: item.meta(),
                    content: item.content(),
                },
            )
        })
        .collect()
}

/// Filter to published metadata and sort newest first.
///
/// The sort is stable, so equal dates keep their input order.
pub fn published_index<'a>(metas: impl IntoIterator<Item = &'a Meta>) -> Vec<&'a Meta> {
    let mut published: Vec<&Meta> = metas
        .into_iter()
        .filter(|m| m.status().is_published())
        .collect();
    // None sorts before Some, so reversing the comparison puts undated last
    published.sort_by(|a, b| b.date().cmp(&a.date()));
    published
}
