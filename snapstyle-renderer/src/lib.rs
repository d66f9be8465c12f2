//! # SnapStyle Renderer
//!
//! CPU rendering for SnapStyle scenes, built on resvg and tiny-skia.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │ Scene        │──▶│ SVG document │──▶│ resvg → tiny-skia    │
//! │ (core)       │   │ (svg.rs)     │   │ (SvgRasterBackend)   │
//! └──────────────┘   └──────────────┘   └──────────┬───────────┘
//!                                                  │ content raster
//!                                       ┌──────────▼───────────┐
//!                                       │ Frame composition    │
//!                                       │ gradient, padding,   │
//!                                       │ rounded clip → PNG   │
//!                                       └──────────────────────┘
//! ```
//!
//! Uploads are decoded with the `image` crate into the core's
//! [`snapstyle_core::RasterImage`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod export;
pub mod href_cache;
pub mod image;
pub mod svg;

pub use backend::{pixmap_to_raster, raster_to_pixmap, SvgRasterBackend};
pub use error::{RenderError, RenderResult};
pub use export::{export_png, ExportedImage, FrameExporter};
pub use href_cache::{CacheStats, ImageHrefCache};
pub use image::{
    decode_uploads, encode_png, load_image_from_bytes, load_image_from_data_uri, load_upload,
    to_data_uri, ImageFormat,
};
pub use svg::{scene_to_svg, scene_to_svg_cached};

use snapstyle_core::{EditorConfig, EditorSession};

/// Editor session drawing through an [`SvgRasterBackend`].
#[must_use]
pub fn session_with_renderer(config: EditorConfig) -> EditorSession {
    EditorSession::with_backend(config, Box::new(SvgRasterBackend::new()))
}
