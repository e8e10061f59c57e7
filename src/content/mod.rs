//! The content model.
//!
//! Every markdown file becomes one [`ContentItem`]. Which variant it becomes
//! is decided once, at discovery, by [`classify`]:
//!
//! | Found under | truthy `image` | truthy `data` | Variant |
//! |---|---|---|---|
//! | `pages/` | any | yes | [`DataPage`] |
//! | `pages/` | any | no | [`Page`] |
//! | `posts/` | yes | any | [`ImagePost`] |
//! | `posts/` | no | yes | [`DataPost`] |
//! | `posts/` | no | no | [`Post`] |
//!
//! Each variant implements [`Process`]: run its asset side effects, then
//! render one `index.html` under `<build_path>/<meta.path>/`.

mod classify;
mod item;
mod page;
mod post;

pub use classify::classify;
pub use item::Item;
pub use page::{DataPage, Page};
pub use post::{DataPost, ImagePost, Post};

use crate::assets::AssetError;
use crate::config::SiteConfig;
use crate::metadata::Meta;
use crate::render::{RenderEnv, TemplateError};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// An item type outside `posts`/`pages` was requested.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("item type not implemented: {0}")]
pub struct NotImplementedError(pub String);

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Top-level content collection an item was discovered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemType {
    Posts,
    Pages,
}

impl ItemType {
    pub const ALL: [ItemType; 2] = [ItemType::Posts, ItemType::Pages];

    /// Directory under the content root, and the path segment stripped
    /// from item paths.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Pages => "pages",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for ItemType {
    type Err = NotImplementedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posts" => Ok(Self::Posts),
            "pages" => Ok(Self::Pages),
            other => Err(NotImplementedError(other.to_string())),
        }
    }
}

/// Which [`ContentItem`] variant an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Post,
    ImagePost,
    DataPost,
    Page,
    DataPage,
}

impl Variant {
    pub fn item_type(self) -> ItemType {
        match self {
            Self::Post | Self::ImagePost | Self::DataPost => ItemType::Posts,
            Self::Page | Self::DataPage => ItemType::Pages,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Post => "post",
            Self::ImagePost => "image post",
            Self::DataPost => "data post",
            Self::Page => "page",
            Self::DataPage => "data page",
        };
        f.write_str(name)
    }
}

/// What processing one item produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The written `index.html`.
    pub index: PathBuf,
    pub images: usize,
    pub thumbnails: usize,
    pub data_files: usize,
}

/// Per-variant processing: asset side effects, then the render.
pub trait Process {
    fn process(&mut self, env: &RenderEnv<'_>) -> Result<Outcome, ProcessError>;
}

/// One discovered source file.
#[derive(Debug, Clone)]
pub enum ContentItem {
    Post(Post),
    ImagePost(ImagePost),
    DataPost(DataPost),
    Page(Page),
    DataPage(DataPage),
}

impl ContentItem {
    /// Build the variant chosen by [`classify`] around a parsed item.
    pub fn new(variant: Variant, item: Item, config: &SiteConfig) -> Self {
        match variant {
            Variant::Post => Self::Post(Post::new(item)),
            Variant::ImagePost => Self::ImagePost(ImagePost::new(item)),
            Variant::DataPost => Self::DataPost(DataPost::new(item)),
            Variant::Page => Self::Page(Page::new(item, &config.home)),
            Variant::DataPage => Self::DataPage(DataPage::new(item, &config.home)),
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Self::Post(_) => Variant::Post,
            Self::ImagePost(_) => Variant::ImagePost,
            Self::DataPost(_) => Variant::DataPost,
            Self::Page(_) => Variant::Page,
            Self::DataPage(_) => Variant::DataPage,
        }
    }

    pub fn item(&self) -> &Item {
        match self {
            Self::Post(p) => &p.item,
            Self::ImagePost(p) => &p.post.item,
            Self::DataPost(p) => &p.post.item,
            Self::Page(p) => &p.item,
            Self::DataPage(p) => &p.page.item,
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.item().meta
    }

    pub fn content(&self) -> &str {
        &self.item().content
    }

    /// Stripped source name of a page; `None` for posts.
    pub fn page_name(&self) -> Option<&str> {
        match self {
            Self::Page(p) => Some(&p.name),
            Self::DataPage(p) => Some(&p.page.name),
            _ => None,
        }
    }
}

impl Process for ContentItem {
    fn process(&mut self, env: &RenderEnv<'_>) -> Result<Outcome, ProcessError> {
        match self {
            Self::Post(p) => p.process(env),
            Self::ImagePost(p) => p.process(env),
            Self::DataPost(p) => p.process(env),
            Self::Page(p) => p.process(env),
            Self::DataPage(p) => p.process(env),
        }
    }
}
