//! End-to-end builds of small sites in a temp directory.

use image::{ImageEncoder, RgbImage};
use mysgen::assets::AssetError;
use mysgen::content::ProcessError;
use mysgen::site::{BuildError, SiteAssembler};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture
// =========================================================================

struct Site {
    dir: TempDir,
}

impl Site {
    /// A site with a `config.json` overlay and a theme just rich enough to
    /// assert on.
    fn new(config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let site = Self { dir };
        for sub in ["content/posts", "content/pages", "theme/templates"] {
            fs::create_dir_all(site.root().join(sub)).unwrap();
        }
        fs::write(site.root().join("config.json"), config).unwrap();
        site.template(
            "article.html",
            "<h1>{{ meta.title }}</h1>\n{{ article_content }}\n\
             {% for p in meta.image_paths or [] %}<a href=\"images/{{ p }}\"></a>{% endfor %}",
        );
        site.template(
            "home.html",
            "{% for a in articles %}<li>{{ a.title }}</li>\n{% endfor %}{{ page_content }}",
        );
        site.template("page.html", "{{ page_content }}");
        site
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn output(&self, relative: &str) -> PathBuf {
        self.root().join("output").join(relative)
    }

    fn read_output(&self, relative: &str) -> String {
        fs::read_to_string(self.output(relative))
            .unwrap_or_else(|e| panic!("output file {relative} not readable: {e}"))
    }

    fn template(&self, name: &str, source: &str) {
        fs::write(self.root().join("theme/templates").join(name), source).unwrap();
    }

    fn markdown(&self, dir: &str, stem: &str, front: &str, body: &str) {
        let path = self.root().join("content").join(dir).join(format!("{stem}.md"));
        fs::write(path, format!("{front}\n\n{body}\n")).unwrap();
    }

    fn post(&self, stem: &str, front: &str, body: &str) {
        self.markdown("posts", stem, front, body);
    }

    fn page(&self, stem: &str, front: &str, body: &str) {
        self.markdown("pages", stem, front, body);
    }

    fn image(&self, gallery: &str, name: &str, width: u32, height: u32) {
        let path = self.root().join("content/images").join(gallery).join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        });
        let writer = std::io::BufWriter::new(fs::File::create(&path).unwrap());
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    fn assembler(&self) -> SiteAssembler {
        SiteAssembler::from_dir(self.root()).unwrap()
    }

    fn files_in(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.output(relative))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

// =========================================================================
// Publishing
// =========================================================================

#[test]
fn only_published_posts_are_written_and_indexed() {
    let site = Site::new("{}");
    site.post("draft", "Title: Draft\nStatus: draft\nDate: 2024-05-01", "wip");
    site.post("live", "Title: Live\nStatus: published\nDate: 2024-04-01", "done");
    site.page("home", "Type: home", "");

    let summary = site.assembler().build().unwrap();

    assert_eq!(site.files_in("posts"), vec!["live"]);
    assert!(site.output("posts/live/index.html").exists());
    assert_eq!(site.read_output("index.html"), "<li>Live</li>\n");
    assert_eq!(summary.posts.skipped, vec!["draft.md"]);
}

#[test]
fn home_page_lands_at_output_root() {
    let site = Site::new("{}");
    site.post("a", "Title: A\nStatus: published", "x");
    site.page("home", "Type: home", "Welcome");
    site.page("about", "Type: page", "About us");

    site.assembler().build().unwrap();

    assert!(site.read_output("index.html").contains("Welcome"));
    assert!(site.read_output("about/index.html").contains("About us"));
    assert!(!site.output("home").exists());
}

#[test]
fn pages_render_regardless_of_status() {
    let site = Site::new("{}");
    site.post("a", "Title: A\nStatus: published", "x");
    site.page("home", "Type: home", "");
    site.page("notes", "Type: page\nStatus: draft", "Draft notes");

    let summary = site.assembler().build().unwrap();

    assert!(site.read_output("notes/index.html").contains("Draft notes"));
    assert_eq!(summary.pages.rendered.len(), 2);
    assert!(summary.pages.skipped.is_empty());
}

#[test]
fn articles_sorted_newest_first() {
    let site = Site::new("{}");
    site.post("a", "Title: Oldest\nStatus: published\nDate: 2023-01-01", "x");
    site.post("b", "Title: Undated\nStatus: published", "x");
    site.post("c", "Title: Newest\nStatus: published\nDate: 2024-12-24", "x");
    site.post("d", "Title: Middle\nStatus: published\nDate: 2024-02-10", "x");
    site.page("home", "Type: home", "");

    site.assembler().build().unwrap();

    assert_eq!(
        site.read_output("index.html"),
        "<li>Newest</li>\n<li>Middle</li>\n<li>Oldest</li>\n<li>Undated</li>\n"
    );
}

#[test]
fn post_url_placeholder_is_replaced() {
    let site = Site::new("{}");
    site.post("share", "Title: Share\nStatus: published", "Link: {{post_url}}");
    site.page("home", "Type: home", "");

    site.assembler().build().unwrap();

    let html = site.read_output("posts/share/index.html");
    assert!(html.contains("Link: /posts/share"));
    assert!(!html.contains("{{post_url}}"));
}

// =========================================================================
// Galleries
// =========================================================================

#[test]
fn only_oversized_images_get_thumbnails() {
    let site = Site::new(r#"{ "thumbnail_size": [100, 100] }"#);
    site.post("trip", "Title: Trip\nStatus: published\nImage: true", "x");
    site.page("home", "Type: home", "");
    site.image("trip", "a.jpg", 300, 200);
    site.image("trip", "b.jpg", 80, 60);
    site.image("trip", "c.jpg", 100, 50);

    let summary = site.assembler().build().unwrap();

    let files = site.files_in("posts/trip/images");
    let small: Vec<_> = files.iter().filter(|f| f.ends_with("_small.jpg")).collect();
    assert_eq!(small, vec!["a_small.jpg"]);
    assert_eq!(files.len(), 4);

    let html = site.read_output("posts/trip/index.html");
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        assert!(html.contains(&format!("href=\"images/{name}\"")), "{name} missing");
    }
    assert_eq!(summary.posts.images(), 3);
    assert_eq!(summary.posts.thumbnails(), 1);

    let thumb = image::image_dimensions(site.output("posts/trip/images/a_small.jpg")).unwrap();
    assert!(thumb.0 <= 100 && thumb.1 <= 100);
}

#[test]
fn mangled_gallery_names_follow_sorted_order() {
    let site = Site::new(r#"{ "mangle_image_name": true }"#);
    site.post("trip", "Title: Trip\nStatus: published\nImage: true", "x");
    site.page("home", "Type: home", "");
    site.image("trip", "b.jpg", 40, 40);
    site.image("trip", "a.jpg", 40, 40);

    site.assembler().build().unwrap();

    assert_eq!(
        site.files_in("posts/trip/images"),
        vec!["0-ca97811.jpg", "1-3e23e81.jpg"]
    );
}

// =========================================================================
// Data bundles and failures
// =========================================================================

#[test]
fn data_post_bundle_copied_next_to_index() {
    let site = Site::new("{}");
    site.post("report", "Title: Report\nStatus: published\nData: true", "x");
    site.page("home", "Type: home", "");
    let bundle = site.root().join("content/data/report");
    fs::create_dir_all(&bundle).unwrap();
    fs::write(bundle.join("table.csv"), "a,b\n1,2\n").unwrap();

    site.assembler().build().unwrap();

    assert_eq!(site.read_output("posts/report/data/table.csv"), "a,b\n1,2\n");
}

#[test]
fn missing_data_dir_aborts_build() {
    let site = Site::new("{}");
    site.post("report", "Title: Report\nStatus: published\nData: true", "x");
    site.page("home", "Type: home", "");

    let err = site.assembler().build().unwrap_err();

    match err {
        BuildError::Item {
            item,
            source: ProcessError::Asset(AssetError::NotFound(path)),
        } => {
            assert_eq!(item, "posts/report.md");
            assert!(path.ends_with("content/data/report"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!site.output("index.html").exists());
}

#[test]
fn empty_posts_dir_is_an_error() {
    let site = Site::new("{}");
    site.page("home", "Type: home", "");
    let err = site.assembler().build().unwrap_err();
    assert!(matches!(err, BuildError::NoContent { .. }));
}

#[test]
fn unknown_config_key_rejected() {
    let site = Site::new(r#"{ "thumbnail_sise": [1, 1] }"#);
    assert!(matches!(
        SiteAssembler::from_dir(site.root()),
        Err(BuildError::Config(_))
    ));
}
