//! Remote asset sync.
//!
//! Some sites keep large media in a bucket rather than in the content tree.
//! When `remote_bucket` is configured, every object in it is pulled into the
//! site directory before discovery, preserving its key as a relative path.
//!
//! Transport is behind [`ObjectStore`]. [`DirectoryStore`] treats a local
//! directory (a mounted bucket, a synced folder) as the bucket.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("bucket not found: {0}")]
    BucketNotFound(String),
    #[error("object key escapes the destination: {0}")]
    InvalidKey(String),
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to list bucket: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A flat key/value object store.
pub trait ObjectStore {
    /// Every object key, `/`-separated.
    fn list(&self) -> Result<Vec<String>, SyncError>;

    /// Write the object stored under `key` to `dest`.
    fn fetch(&self, key: &str, dest: &Path) -> Result<(), SyncError>;
}

/// A directory used as a bucket: keys are file paths relative to `root`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SyncError::BucketNotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }
}

impl ObjectStore for DirectoryStore {
    fn list(&self) -> Result<Vec<String>, SyncError> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let key: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            keys.push(key.join("/"));
        }
        Ok(keys)
    }

    fn fetch(&self, key: &str, dest: &Path) -> Result<(), SyncError> {
        let source = self.root.join(key);
        fs::copy(&source, dest).map_err(|source_err| SyncError::Io {
            path: source,
            source: source_err,
        })?;
        Ok(())
    }
}

/// Reject keys that would land outside the destination root.
fn validate_key(key: &str) -> Result<&Path, SyncError> {
    let path = Path::new(key);
    let safe = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if safe {
        Ok(path)
    } else {
        Err(SyncError::InvalidKey(key.to_string()))
    }
}

/// Download every object of `store` into `dest_root/<key>`.
///
/// Returns the number of objects fetched. Existing files are overwritten.
pub fn sync_objects(store: &dyn ObjectStore, dest_root: &Path) -> Result<usize, SyncError> {
    let keys = store.list()?;
    for key in &keys {
        let dest = dest_root.join(validate_key(key)?);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| SyncError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        store.fetch(key, &dest)?;
        tracing::debug!("fetched {}", key);
    }
    Ok(keys.len())
}
