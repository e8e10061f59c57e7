//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{fit_within, needs_thumbnail};
use super::params::{Quality, ThumbnailParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &dyn ImageBackend, path: &Path) -> Result<(u32, u32)> {
    Ok(backend.identify(path)?.as_tuple())
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailConfig {
    /// Bounding box as `(width, height)`.
    pub bound: (u32, u32),
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            bound: (800, 800),
            quality: Quality::default(),
        }
    }
}

/// Plan a thumbnail operation without executing it.
///
/// Returns `None` when the source is already within the bound.
pub fn plan_thumbnail(
    source: &Path,
    output: &Path,
    source_dims: (u32, u32),
    config: &ThumbnailConfig,
) -> Option<ThumbnailParams> {
    if !needs_thumbnail(source_dims, config.bound) {
        return None;
    }
    let (width, height) = fit_within(source_dims, config.bound);
    Some(ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        quality: config.quality,
    })
}

/// Create a thumbnail of `source` at `output` if it exceeds the bound.
///
/// Returns the thumbnail's dimensions, or `None` if nothing was written.
pub fn create_thumbnail(
    backend: &dyn ImageBackend,
    source: &Path,
    output: &Path,
    config: &ThumbnailConfig,
) -> Result<Option<Dimensions>> {
    let dims = get_dimensions(backend, source)?;
    let Some(params) = plan_thumbnail(source, output, dims, config) else {
        return Ok(None);
    };
    backend.thumbnail(&params)?;
    Ok(Some(Dimensions {
        width: params.width,
        height: params.height,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 1920,
            height: 1080,
        }]);

        let dims = get_dimensions(&backend, Path::new("/test.jpg")).unwrap();
        assert_eq!(dims, (1920, 1080));
    }

    #[test]
    fn plan_thumbnail_fits_inside_bound() {
        let params = plan_thumbnail(
            Path::new("/a.jpg"),
            Path::new("/a_small.jpg"),
            (1600, 1200),
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!((params.width, params.height), (800, 600));
        assert_eq!(params.quality.value(), 95);
    }

    #[test]
    fn plan_thumbnail_skips_small_images() {
        let plan = plan_thumbnail(
            Path::new("/a.jpg"),
            Path::new("/a_small.jpg"),
            (640, 480),
            &ThumbnailConfig::default(),
        );
        assert!(plan.is_none());
    }

    #[test]
    fn create_thumbnail_uses_backend() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 1200,
            height: 1600,
        }]);

        let result = create_thumbnail(
            &backend,
            Path::new("/images/tall.jpg"),
            Path::new("/images/tall_small.jpg"),
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(
            result,
            Some(Dimensions {
                width: 600,
                height: 800
            })
        );

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[1],
            RecordedOp::Thumbnail { output, width: 600, height: 800, .. }
                if output == "/images/tall_small.jpg"
        ));
    }

    #[test]
    fn create_thumbnail_within_bound_only_identifies() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 400,
            height: 300,
        }]);

        let result = create_thumbnail(
            &backend,
            Path::new("/images/small.jpg"),
            Path::new("/images/small_small.jpg"),
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(result, None);
        assert_eq!(backend.get_operations().len(), 1);
    }
}
