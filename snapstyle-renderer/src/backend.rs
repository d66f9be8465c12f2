//! CPU surface backend built on resvg.

use std::fmt;
use std::sync::{Arc, RwLock};

use snapstyle_core::surface::scaled_size;
use snapstyle_core::{RasterImage, Scene, SceneResult, SurfaceBackend};
use tracing::{debug, trace};

use crate::error::{RenderError, RenderResult};
use crate::href_cache::ImageHrefCache;
use crate::svg::scene_to_svg_cached;

/// Rasterizes scenes by way of an SVG document and resvg.
///
/// `present` keeps the latest SVG frame so a host can show it; `rasterize`
/// produces the export content. Embedded images are encoded once per object
/// and shared by both paths; clones share the cache.
#[derive(Clone)]
pub struct SvgRasterBackend {
    fontdb: Arc<usvg::fontdb::Database>,
    hrefs: Arc<RwLock<ImageHrefCache>>,
    last_frame: Option<String>,
}

impl SvgRasterBackend {
    /// Backend with the system fonts loaded.
    #[must_use]
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "loaded system fonts");
        Self::with_fontdb(Arc::new(db))
    }

    /// Backend sharing an existing font database.
    #[must_use]
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            fontdb,
            hrefs: Arc::new(RwLock::new(ImageHrefCache::new())),
            last_frame: None,
        }
    }

    /// Number of image data URIs currently cached.
    #[must_use]
    pub fn cached_images(&self) -> usize {
        self.hrefs.read().map_or(0, |hrefs| hrefs.len())
    }

    /// Build the SVG document for `scene` through the shared image cache.
    ///
    /// # Errors
    ///
    /// Returns an error if an image cannot be encoded or the cache lock is
    /// poisoned.
    pub fn frame_svg(&self, scene: &Scene, width: u32, height: u32) -> RenderResult<String> {
        let mut hrefs = self
            .hrefs
            .write()
            .map_err(|_| RenderError::Resource("Image cache lock poisoned".to_string()))?;
        scene_to_svg_cached(scene, width, height, &mut hrefs)
    }

    /// SVG of the most recently presented frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }

    /// Rasterize the scene into a premultiplied pixmap.
    ///
    /// # Errors
    ///
    /// Returns an error if the SVG cannot be built or parsed, or the size is empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn render_pixmap(
        &self,
        scene: &Scene,
        width: u32,
        height: u32,
        multiplier: f64,
    ) -> RenderResult<tiny_skia::Pixmap> {
        let (px_w, px_h) = scaled_size(width, height, multiplier)?;
        let svg_string = self.frame_svg(scene, width, height)?;

        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_str(&svg_string, &opt)
            .map_err(|e| RenderError::Svg(format!("SVG parsing failed: {e}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h)
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        let transform = tiny_skia::Transform::from_scale(
            px_w as f32 / width as f32,
            px_h as f32 / height as f32,
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());
        trace!(px_w, px_h, objects = scene.len(), "rasterized scene");

        Ok(pixmap)
    }
}

impl Default for SvgRasterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SvgRasterBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvgRasterBackend")
            .field("font_faces", &self.fontdb.len())
            .field("cached_images", &self.cached_images())
            .field("has_frame", &self.last_frame.is_some())
            .finish()
    }
}

impl SurfaceBackend for SvgRasterBackend {
    fn present(&mut self, scene: &Scene, width: u32, height: u32) {
        match self.frame_svg(scene, width, height) {
            Ok(svg) => self.last_frame = Some(svg),
            Err(err) => debug!(%err, "could not present frame"),
        }
    }

    fn rasterize(
        &self,
        scene: &Scene,
        width: u32,
        height: u32,
        multiplier: f64,
    ) -> SceneResult<RasterImage> {
        self.render_pixmap(scene, width, height, multiplier)
            .and_then(|pixmap| pixmap_to_raster(&pixmap))
            .map_err(RenderError::into_scene_error)
    }
}

/// Convert premultiplied pixmap pixels to a straight-alpha raster.
///
/// # Errors
///
/// Returns an error if the pixmap size is inconsistent.
pub fn pixmap_to_raster(pixmap: &tiny_skia::Pixmap) -> RenderResult<RasterImage> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(RasterImage::new(pixmap.width(), pixmap.height(), data)?)
}

/// Convert a straight-alpha raster to a premultiplied pixmap.
///
/// # Errors
///
/// Returns an error if the raster is empty.
pub fn raster_to_pixmap(image: &RasterImage) -> RenderResult<tiny_skia::Pixmap> {
    let mut pixmap = tiny_skia::Pixmap::new(image.width(), image.height())
        .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(image.data().chunks_exact(4))
    {
        *dst = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}
