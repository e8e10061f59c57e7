//! Asset pipeline: copying item attachments into the output tree.
//!
//! Two kinds of attachment exist:
//!
//! - **Data bundles** (`content/data/<stem>/`): an arbitrary tree, copied as is.
//! - **Galleries** (`content/images/<stem>/`): copied, optionally renamed to
//!   mangled public names, then thumbnailed.
//!
//! ```text
//! content/images/hike/        output/posts/hike/images/
//! ├── b.jpg          ──►      ├── 1-3e23e81.jpg          (mangled)
//! └── a.jpg                   ├── 0-ca97811.jpg
//!                             └── 0-ca97811_small.jpg    (a.jpg exceeded the bound)
//! ```
//!
//! Gallery images are enumerated from the *source* directory, so leftovers
//! from an earlier build in the output directory never join the gallery.
//! Every step overwrites what it finds, which makes rebuilding into an
//! existing output tree safe.

use crate::imaging::{BackendError, ImageBackend, ThumbnailConfig, create_thumbnail};
use crate::naming::{is_thumbnail, mangled_name, thumbnail_name};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk asset tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("image {}: {source}", path.display())]
    Imaging {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> AssetError + '_ {
    move |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Final gallery listing, recorded into the item's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    /// Public filename of every image, in sorted source order.
    pub image_paths: Vec<String>,
    /// Per image: its `_small` thumbnail if one was made, else the image itself.
    pub thumbnails: Vec<String>,
}

impl Gallery {
    pub fn thumbnail_count(&self) -> usize {
        self.thumbnails.iter().filter(|t| is_thumbnail(t)).count()
    }
}

/// Recursively copy `from` into `to`, merging with whatever `to` holds.
///
/// Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize, AssetError> {
    if !from.is_dir() {
        return Err(AssetError::NotFound(from.to_path_buf()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(io_err(&target))?;
            copied += 1;
        }
    }

    tracing::debug!("copied {} files {} → {}", copied, from.display(), to.display());
    Ok(copied)
}

/// Sorted filenames of the gallery images directly inside `dir`.
///
/// Only top-level files with an extension count; `_small` files are never
/// treated as originals.
pub fn list_images(dir: &Path) -> Result<Vec<String>, AssetError> {
    if !dir.is_dir() {
        return Err(AssetError::NotFound(dir.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        if !entry.file_type().map_err(io_err(dir))?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !name.contains('.') || is_thumbnail(&name) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Copy a gallery from `from` to `to` and give each image its public name.
///
/// Returns the public names in sorted source order. With `mangle` set, the
/// image at index `i` becomes [`mangled_name`]`(i, name)`.
pub fn place_images(from: &Path, to: &Path, mangle: bool) -> Result<Vec<String>, AssetError> {
    let sources = list_images(from)?;
    copy_tree(from, to)?;

    if !mangle {
        return Ok(sources);
    }

    let mut placed = Vec::with_capacity(sources.len());
    for (index, name) in sources.iter().enumerate() {
        let public = mangled_name(index, name);
        let target = to.join(&public);
        fs::rename(to.join(name), &target).map_err(io_err(&target))?;
        placed.push(public);
    }
    Ok(placed)
}

/// Thumbnail every image in `dir` that exceeds the configured bound.
///
/// Thumbnails are written next to their originals as `<stem>_small.<ext>`.
/// An unreadable image fails the whole gallery.
pub fn make_thumbnails(
    backend: &dyn ImageBackend,
    dir: &Path,
    images: &[String],
    config: &ThumbnailConfig,
) -> Result<Gallery, AssetError> {
    let mut gallery = Gallery {
        image_paths: images.to_vec(),
        thumbnails: Vec::with_capacity(images.len()),
    };

    for name in images {
        let source = dir.join(name);
        let small = thumbnail_name(name);
        let made = create_thumbnail(backend, &source, &dir.join(&small), config).map_err(
            |source_err| AssetError::Imaging {
                path: source.clone(),
                source: source_err,
            },
        )?;

        match made {
            Some(dims) => {
                tracing::debug!("thumbnail {} ({}x{})", small, dims.width, dims.height);
                gallery.thumbnails.push(small);
            }
            None => gallery.thumbnails.push(name.clone()),
        }
    }

    Ok(gallery)
}

/// Full gallery pass: place the images, then thumbnail them.
pub fn publish_gallery(
    backend: &dyn ImageBackend,
    from: &Path,
    to: &Path,
    mangle: bool,
    config: &ThumbnailConfig,
) -> Result<Gallery, AssetError> {
    let images = place_images(from, to, mangle)?;
    make_thumbnails(backend, to, &images, config)
}
