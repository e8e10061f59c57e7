//! Shared test utilities for the mysgen test suite.
//!
//! Builds throwaway sites in a temp directory: content files with front
//! matter, a minimal theme, and synthetic JPEGs.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = TestSite::new();
//! site.post("hello", "Title: Hello\nStatus: published\nDate: 2024-06-01", "Body");
//! site.page("about", "Type: page", "About me");
//! site.minimal_theme();
//!
//! let config = site.config();
//! ```

use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::SiteConfig;

// =========================================================================
// Images
// =========================================================================

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

// =========================================================================
// Site fixture
// =========================================================================

/// A site rooted in a temp directory, laid out like a real one:
///
/// ```text
/// <root>/content/{posts,pages,images,data}
/// <root>/theme/templates
/// <root>/output
/// ```
pub struct TestSite {
    pub dir: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for sub in ["content/posts", "content/pages", "theme/templates"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn content(&self) -> PathBuf {
        self.root().join("content")
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("output")
    }

    /// Stock config with every path pointing inside this site.
    pub fn config(&self) -> SiteConfig {
        SiteConfig {
            src_path: self.content(),
            build_path: self.output(),
            theme_path: self.root().join("theme"),
            ..SiteConfig::default()
        }
    }

    fn write_markdown(&self, dir: &str, stem: &str, front: &str, body: &str) -> PathBuf {
        let path = self.content().join(dir).join(format!("{stem}.md"));
        fs::write(&path, format!("{front}\n\n{body}\n")).unwrap();
        path
    }

    pub fn post(&self, stem: &str, front: &str, body: &str) -> PathBuf {
        self.write_markdown("posts", stem, front, body)
    }

    pub fn page(&self, stem: &str, front: &str, body: &str) -> PathBuf {
        self.write_markdown("pages", stem, front, body)
    }

    /// A JPEG under `content/images/<gallery>/`.
    pub fn image(&self, gallery: &str, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.content().join("images").join(gallery).join(name);
        create_test_jpeg(&path, width, height);
        path
    }

    /// A file under `content/data/<bundle>/`.
    pub fn data_file(&self, bundle: &str, relative: &str, contents: &str) -> PathBuf {
        let path = self.content().join("data").join(bundle).join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn template(&self, name: &str, source: &str) {
        fs::write(self.root().join("theme/templates").join(name), source).unwrap();
    }

    /// Templates that print just enough to assert on.
    pub fn minimal_theme(&self) {
        self.template(
            "article.html",
            "<h1>{{ meta.title }}</h1>\n{{ article_content }}\n\
             {% for t in meta.thumbnails or [] %}<img src=\"images/{{ t }}\">{% endfor %}",
        );
        self.template(
            "home.html",
            "{% for a in articles %}<li>{{ a.title }}</li>\n{% endfor %}{{ page_content }}",
        );
        self.template("page.html", "{{ page_content }}");
    }

    /// Read a file under the output root.
    pub fn read_output(&self, relative: &str) -> String {
        fs::read_to_string(self.output().join(relative))
            .unwrap_or_else(|e| panic!("output file {relative} not readable: {e}"))
    }
}
