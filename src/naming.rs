//! Path and filename derivation.
//!
//! Every output location is a pure function of a source filename and a few
//! config values. Keeping the rules here means the content types never build
//! paths by hand.
//!
//! | Input | Rule | Example |
//! |---|---|---|
//! | source file | relative to content root, extension stripped | `content/posts/hike.md` → `posts/hike` |
//! | post path | leading `/` | `posts/hike` → `/posts/hike` |
//! | page name | home maps to the root | `home` → `""`, `about` → `about` |
//! | image | `_small` before the extension | `dawn.jpg` → `dawn_small.jpg` |
//! | mangled image | sorted index + sha256 of the stem | `a.jpg` → `0-ca97811.jpg`[^1] |
//!
//! [^1]: first seven hex digits.

use sha2::{Digest, Sha256};
use std::path::{Component, Path};

/// Suffix inserted before the extension of a thumbnail.
pub const THUMBNAIL_SUFFIX: &str = "_small";

/// Relative item path of a source file: `posts/hike` for `<root>/posts/hike.md`.
///
/// Returns `None` when `file` is not under `root`.
pub fn item_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Remove every path segment equal to `segment`: `posts/hike` → `hike`.
pub fn strip_segment(path: &str, segment: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Output path of a page with stripped name `name`.
pub fn page_output_path(name: &str, home: &str) -> String {
    if name == home {
        String::new()
    } else {
        name.to_string()
    }
}

/// Absolute site URL of an item path.
pub fn item_url(path: &str) -> String {
    format!("/{path}")
}

/// Stem and extension (with its dot) of a filename.
fn split_name(filename: &str) -> (&str, &str) {
    let path = Path::new(filename);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    let ext_len = filename.len() - stem.len();
    (stem, &filename[filename.len() - ext_len..])
}

/// Thumbnail filename: `dawn.jpg` → `dawn_small.jpg`.
pub fn thumbnail_name(filename: &str) -> String {
    let (stem, ext) = split_name(filename);
    format!("{stem}{THUMBNAIL_SUFFIX}{ext}")
}

/// Whether a filename looks like a generated thumbnail.
pub fn is_thumbnail(filename: &str) -> bool {
    split_name(filename).0.ends_with(THUMBNAIL_SUFFIX)
}

/// Public name of an image at `index` in sorted order.
///
/// `<index>-<first 7 hex digits of sha256(stem)><ext>`. Stable across builds
/// as long as the set of images is unchanged.
pub fn mangled_name(index: usize, filename: &str) -> String {
    let (stem, ext) = split_name(filename);
    let digest = format!("{:x}", Sha256::digest(stem.as_bytes()));
    format!("{index}-{}{ext}", &digest[..7])
}
