//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Thumbnail** | `resize_exact` with Lanczos3, fit inside the configured bound |
//! | **Encode** | `JpegEncoder` at the configured quality, other formats by extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_within, needs_thumbnail};
pub use operations::{ThumbnailConfig, create_thumbnail, get_dimensions};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
