//! Blog entries: plain posts, gallery posts and posts with a data bundle.
//!
//! A post at `content/posts/<stem>.md` has item path `posts/<stem>` and
//! renders the `article` template to `<output>/posts/<stem>/index.html`.
//! Attachments are looked up by the path with `posts` stripped:
//!
//! ```text
//! content/images/<stem>/  →  <output>/posts/<stem>/images/
//! content/data/<stem>/    →  <output>/posts/<stem>/data/
//! ```

use super::{Item, Outcome, Process, ProcessError};
use crate::assets::{copy_tree, publish_gallery};
use crate::imaging::{Quality, ThumbnailConfig};
use crate::metadata::MetaValue;
use crate::naming::{item_url, strip_segment};
use crate::render::{RenderContext, RenderEnv, resolve_placeholder};
use std::path::PathBuf;

/// Template every post renders with.
pub const ARTICLE_TEMPLATE: &str = "article";

const IMAGES_DIR: &str = "images";
const DATA_DIR: &str = "data";

/// A single blog entry.
#[derive(Debug, Clone)]
pub struct Post {
    pub item: Item,
}

impl Post {
    pub fn new(item: Item) -> Self {
        Self { item }
    }

    /// Absolute URL of this post, e.g. `/posts/hike`.
    pub fn url(&self) -> String {
        item_url(self.item.meta.path())
    }

    /// Item path without the `posts` segment; names the attachment dirs.
    fn stem_path(&self) -> String {
        strip_segment(self.item.meta.path(), "posts")
    }

    fn context(&self, env: &RenderEnv<'_>) -> Result<RenderContext, ProcessError> {
        let url = self.url();
        let mut ctx = env.context();
        ctx.insert("meta", &self.item.meta)?;
        ctx.insert(
            "article_content",
            resolve_placeholder(&self.item.content, &env.config.post_url, &url),
        )?;
        ctx.insert("page", &env.config.home)?;
        ctx.insert("page_name", "index")?;
        ctx.insert("post_url", &url)?;
        Ok(ctx)
    }

    fn render(&self, env: &RenderEnv<'_>) -> Result<PathBuf, ProcessError> {
        let ctx = self.context(env)?;
        self.item.render(env, ARTICLE_TEMPLATE, &ctx)
    }
}

impl Process for Post {
    fn process(&mut self, env: &RenderEnv<'_>) -> Result<Outcome, ProcessError> {
        Ok(Outcome {
            index: self.render(env)?,
            ..Outcome::default()
        })
    }
}

/// A post with a photo gallery.
#[derive(Debug, Clone)]
pub struct ImagePost {
    pub post: Post,
    /// `content/images/<stem>`
    pub from_path: PathBuf,
    /// `<output>/<item path>/images`
    pub to_path: PathBuf,
}

impl ImagePost {
    pub fn new(item: Item) -> Self {
        let post = Post::new(item);
        let from_path = post.item.src_path.join(IMAGES_DIR).join(post.stem_path());
        let to_path = post.item.output_dir().join(IMAGES_DIR);
        Self {
            post,
            from_path,
            to_path,
        }
    }
}

impl Process for ImagePost {
    fn process(&mut self, env: &RenderEnv<'_>) -> Result<Outcome, ProcessError> {
        let config = ThumbnailConfig {
            bound: env.config.thumbnail_bound(),
            quality: Quality::new(env.config.thumbnail_quality),
        };
        let gallery = publish_gallery(
            env.backend,
            &self.from_path,
            &self.to_path,
            env.config.mangle_image_name,
            &config,
        )?;
        if gallery.image_paths.is_empty() {
            tracing::warn!(
                "image post {} has no images in {}",
                self.post.url(),
                self.from_path.display()
            );
        }

        let meta = &mut self.post.item.meta;
        meta.insert("image_paths", MetaValue::List(gallery.image_paths.clone()));
        meta.insert("thumbnails", MetaValue::List(gallery.thumbnails.clone()));
        meta.insert("thumbnail_size", MetaValue::Size(env.config.thumbnail_size));

        tracing::debug!(
            "gallery {}: {} images, {} thumbnails",
            self.to_path.display(),
            gallery.image_paths.len(),
            gallery.thumbnail_count()
        );

        Ok(Outcome {
            index: self.post.render(env)?,
            images: gallery.image_paths.len(),
            thumbnails: gallery.thumbnail_count(),
            data_files: 0,
        })
    }
}

/// A post with an attached directory of arbitrary files.
#[derive(Debug, Clone)]
pub struct DataPost {
    pub post: Post,
    /// `content/data/<stem>`
    pub from_path: PathBuf,
    /// `<output>/<item path>/data`
    pub to_path: PathBuf,
}

impl DataPost {
    pub fn new(item: Item) -> Self {
        let post = Post::new(item);
        let from_path = post.item.src_path.join(DATA_DIR).join(post.stem_path());
        let to_path = post.item.output_dir().join(DATA_DIR);
        Self {
            post,
            from_path,
            to_path,
        }
    }
}

impl Process for DataPost {
    fn process(&mut self, env: &RenderEnv<'_>) -> Result<Outcome, ProcessError> {
        let data_files = copy_tree(&self.from_path, &self.to_path)?;
        Ok(Outcome {
            index: self.post.render(env)?,
            data_files,
            ..Outcome::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetError;
    use crate::imaging::RustBackend;
    use crate::markdown::MarkdownConverter;
    use crate::metadata::normalize;
    use crate::render::TemplateSet;
    use crate::test_helpers::TestSite;
    use std::fs;
    use std::sync::Arc;

    fn item(site: &TestSite, path: &str, source: &str) -> Item {
        let converted = MarkdownConverter::default().convert(source);
        let mut meta = normalize(converted.meta).unwrap().meta;
        meta.set_path(path);
        Item::new(
            meta,
            converted.html,
            Arc::from(site.content().as_path()),
            Arc::from(site.output().as_path()),
        )
    }

    fn templates(site: &TestSite) -> TemplateSet {
        site.minimal_theme();
        TemplateSet::load(&site.root().join("theme/templates")).unwrap()
    }

    #[test]
    fn attachment_paths_strip_posts_segment() {
        let site = TestSite::new();
        let image = ImagePost::new(item(&site, "posts/hike", "Image: true\n\nx"));
        assert_eq!(image.from_path, site.content().join("images/hike"));
        assert_eq!(image.to_path, site.output().join("posts/hike/images"));

        let data = DataPost::new(item(&site, "posts/report", "Data: true\n\nx"));
        assert_eq!(data.from_path, site.content().join("data/report"));
        assert_eq!(data.to_path, site.output().join("posts/report/data"));
    }

    #[test]
    fn post_renders_article_with_resolved_url() {
        let site = TestSite::new();
        let templates = templates(&site);
        let config = site.config();
        let base = RenderContext::new();
        let backend = RustBackend::new();
        let env = RenderEnv {
            templates: &templates,
            base: &base,
            config: &config,
            build_date: "2024-06-01",
            backend: &backend,
        };

        let mut post = Post::new(item(
            &site,
            "posts/hello",
            "Title: Hello\n\nShare {{post_url}} or [the link]({{post_url}}).",
        ));
        let outcome = post.process(&env).unwrap();

        assert_eq!(outcome.index, site.output().join("posts/hello/index.html"));
        let html = fs::read_to_string(&outcome.index).unwrap();
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("Share /posts/hello or"));
        assert!(html.contains("href=\"/posts/hello\""));
        assert!(!html.contains("post_url"));
        // stored content keeps the token
        assert!(post.item.content.contains("{{post_url}}"));
    }

    #[test]
    fn image_post_records_gallery_before_render() {
        let site = TestSite::new();
        site.image("trip", "a.jpg", 1200, 900);
        site.image("trip", "b.jpg", 300, 200);
        let templates = templates(&site);
        let config = site.config();
        let base = RenderContext::new();
        let backend = RustBackend::new();
        let env = RenderEnv {
            templates: &templates,
            base: &base,
            config: &config,
            build_date: "2024-06-01",
            backend: &backend,
        };

        let mut post = ImagePost::new(item(&site, "posts/trip", "Title: Trip\nImage: true\n\nx"));
        let outcome = post.process(&env).unwrap();

        assert_eq!(outcome.images, 2);
        assert_eq!(outcome.thumbnails, 1);
        assert_eq!(
            post.post.item.meta.get("thumbnails"),
            Some(&MetaValue::List(vec!["a_small.jpg".into(), "b.jpg".into()]))
        );
        assert_eq!(
            post.post.item.meta.get("thumbnail_size"),
            Some(&MetaValue::Size([800, 800]))
        );
        let html = site.read_output("posts/trip/index.html");
        assert!(html.contains("<img src=\"images/a_small.jpg\">"));
        assert!(site.output().join("posts/trip/images/a_small.jpg").exists());
    }

    #[test]
    fn data_post_missing_bundle_is_asset_not_found() {
        let site = TestSite::new();
        let templates = templates(&site);
        let config = site.config();
        let base = RenderContext::new();
        let backend = RustBackend::new();
        let env = RenderEnv {
            templates: &templates,
            base: &base,
            config: &config,
            build_date: "2024-06-01",
            backend: &backend,
        };

        let mut post = DataPost::new(item(&site, "posts/report", "Data: true\n\nx"));
        let err = post.process(&env).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Asset(AssetError::NotFound(ref p)) if p.ends_with("data/report")
        ));
    }

    #[test]
    fn data_post_copies_bundle() {
        let site = TestSite::new();
        site.data_file("report", "table.csv", "a,b\n");
        let templates = templates(&site);
        let config = site.config();
        let base = RenderContext::new();
        let backend = RustBackend::new();
        let env = RenderEnv {
            templates: &templates,
            base: &base,
            config: &config,
            build_date: "2024-06-01",
            backend: &backend,
        };

        let mut post = DataPost::new(item(&site, "posts/report", "Data: true\n\nx"));
        let outcome = post.process(&env).unwrap();
        assert_eq!(outcome.data_files, 1);
        assert_eq!(site.read_output("posts/report/data/table.csv"), "a,b\n");
    }
}
