//! # mysgen
//!
//! A small static site generator for a markdown blog with photo galleries.
//! A site is a directory with a `config.json`, a content tree and a theme of
//! Jinja-style templates:
//!
//! ```text
//! config.json
//! content/
//! ├── posts/<stem>.md        blog entries
//! ├── pages/<name>.md        standalone pages, `type` names the template
//! ├── images/<stem>/         gallery of an image post
//! └── data/<stem>/           files attached to a data post or page
//! theme/templates/*.html
//! ```
//!
//! # Pipeline
//!
//! One build runs straight through, in a single thread:
//!
//! ```text
//! 1. Sync       remote bucket → site dir           (only when configured)
//! 2. Templates  theme/templates → TemplateSet
//! 3. Discover   content/{posts,pages} → ContentItems, taxonomy
//! 4. Menu       seed + every page name
//! 5. Posts      published posts → output/posts/<stem>/index.html
//! 6. Pages      every page, with the published index → output/<name>/index.html
//! ```
//!
//! The first failure aborts the build; files written before it stay.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | The pipeline: discovery, menu, processing passes, build summary |
//! | [`content`] | `ContentItem` variants and their per-variant processing |
//! | [`config`] | `config.json` loading, merging over stock defaults, validation |
//! | [`markdown`] | Front matter and markdown to HTML conversion |
//! | [`metadata`] | Front matter normalization, status, taxonomy |
//! | [`render`] | Template set, render context, placeholder resolution |
//! | [`assets`] | Gallery publishing and data directory copies |
//! | [`imaging`] | Image backend: dimensions, thumbnails |
//! | [`naming`] | Item paths, output paths, mangled image names |
//! | [`sync`] | Pulling a remote bucket into the site directory |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## A Closed Set of Content Variants
//!
//! A source file becomes exactly one of five variants, chosen once at
//! discovery from its collection and its `image`/`data` flags. Processing
//! dispatches on the enum; there is no runtime registry of item kinds.
//!
//! ## Templates at Runtime
//!
//! Themes are plain template files loaded when the build starts, so a site
//! can change its look without recompiling the generator.
//!
//! ## Shared State Only During Discovery
//!
//! Tags and categories are collected while parsing. After that the render
//! context is built once per pass and cloned for every item, so no item can
//! leak values into the next one.

pub mod assets;
pub mod config;
pub mod content;
pub mod imaging;
pub mod markdown;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod render;
pub mod site;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_helpers;
