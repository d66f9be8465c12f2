//! Framed PNG export.
//!
//! Composes the rasterized canvas content onto the frame background:
//! a rounded rectangle filled with the frame's gradient or solid color,
//! with the content drawn at the padding offset. A transparent frame skips
//! the background and its clip entirely.

use snapstyle_core::{
    Background, EditorConfig, EditorSession, FrameStyle, LinearGradient, RasterImage,
};
use tracing::{debug, info};

use crate::backend::raster_to_pixmap;
use crate::error::{RenderError, RenderResult};

/// Cubic Bezier handle length for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// A finished export, ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// File name to save under.
    pub filename: String,
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Composes framed exports at a fixed resolution multiplier.
#[derive(Debug, Clone)]
pub struct FrameExporter {
    multiplier: f64,
    filename: String,
}

impl FrameExporter {
    /// Create an exporter.
    #[must_use]
    pub fn new(multiplier: f64, filename: impl Into<String>) -> Self {
        Self {
            multiplier,
            filename: filename.into(),
        }
    }

    /// Create an exporter from the editor configuration.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.export_multiplier, config.export_filename.clone())
    }

    /// Resolution multiplier.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Rasterize the session's content through its surface and frame it.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization, composition or encoding fails.
    pub fn export(&self, session: &EditorSession) -> RenderResult<ExportedImage> {
        let content = session.rasterize_content(self.multiplier)?;
        let pixmap = self.compose(session.frame(), session.content_size(), &content)?;

        let png = pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;

        info!(
            width = pixmap.width(),
            height = pixmap.height(),
            bytes = png.len(),
            filename = %self.filename,
            "exported framed image"
        );

        Ok(ExportedImage {
            filename: self.filename.clone(),
            png,
            width: pixmap.width(),
            height: pixmap.height(),
        })
    }

    /// Output size in pixels for a logical content size under `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive multiplier or an empty output.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_size(
        &self,
        frame: &FrameStyle,
        content_size: (u32, u32),
    ) -> RenderResult<(u32, u32)> {
        if !(self.multiplier.is_finite() && self.multiplier > 0.0) {
            return Err(RenderError::Export(format!(
                "multiplier must be positive, got {}",
                self.multiplier
            )));
        }
        let pad = frame.padding.max(0.0) * 2.0;
        let w = ((f64::from(content_size.0) + pad) * self.multiplier).round() as u32;
        let h = ((f64::from(content_size.1) + pad) * self.multiplier).round() as u32;
        if w == 0 || h == 0 {
            return Err(RenderError::Export(format!("empty output {w}x{h}")));
        }
        Ok((w, h))
    }

    /// Compose already rasterized content onto the frame background.
    ///
    /// `content` is expected at `content_size` times the multiplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the output size is empty or a pixmap cannot be allocated.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn compose(
        &self,
        frame: &FrameStyle,
        content_size: (u32, u32),
        content: &RasterImage,
    ) -> RenderResult<tiny_skia::Pixmap> {
        let (width, height) = self.output_size(frame, content_size)?;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        let clip = match frame.background() {
            Background::Transparent => {
                debug!("transparent frame, skipping background");
                None
            }
            background => {
                let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
                let radius = (frame.border_radius * self.multiplier) as f32;
                let path = rounded_rect(w, h, radius)
                    .ok_or_else(|| RenderError::Export("Invalid frame geometry".to_string()))?;

                let paint = tiny_skia::Paint {
                    shader: background_shader(background, w, h),
                    anti_alias: true,
                    ..tiny_skia::Paint::default()
                };
                pixmap.fill_path(
                    &path,
                    &paint,
                    tiny_skia::FillRule::Winding,
                    tiny_skia::Transform::identity(),
                    None,
                );

                let mut mask = tiny_skia::Mask::new(width, height)
                    .ok_or_else(|| RenderError::Export("Failed to create mask".to_string()))?;
                mask.fill_path(
                    &path,
                    tiny_skia::FillRule::Winding,
                    true,
                    tiny_skia::Transform::identity(),
                );
                Some(mask)
            }
        };

        if content.width() > 0 && content.height() > 0 {
            let content = raster_to_pixmap(content)?;
            let offset = (frame.padding.max(0.0) * self.multiplier).round() as i32;
            pixmap.draw_pixmap(
                offset,
                offset,
                content.as_ref(),
                &tiny_skia::PixmapPaint::default(),
                tiny_skia::Transform::identity(),
                clip.as_ref(),
            );
        }

        Ok(pixmap)
    }
}

impl Default for FrameExporter {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// Export the session with its configured multiplier and file name.
///
/// # Errors
///
/// Returns an error if rasterization, composition or encoding fails.
pub fn export_png(session: &EditorSession) -> RenderResult<ExportedImage> {
    FrameExporter::from_config(session.config()).export(session)
}

fn skia_color(color: snapstyle_core::Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn background_shader(
    background: Background,
    width: f32,
    height: f32,
) -> tiny_skia::Shader<'static> {
    match background {
        Background::Transparent => tiny_skia::Shader::SolidColor(tiny_skia::Color::TRANSPARENT),
        Background::Solid(color) => tiny_skia::Shader::SolidColor(skia_color(color)),
        Background::Gradient(gradient) => gradient_shader(&gradient, width, height)
            .unwrap_or_else(|| tiny_skia::Shader::SolidColor(skia_color(gradient.to))),
    }
}

/// Linear gradient over a `width` x `height` box following CSS angle rules:
/// 0deg points up, angles turn clockwise, and the gradient line is long enough
/// that the corners receive the end colors.
#[allow(clippy::cast_possible_truncation)]
fn gradient_shader(
    gradient: &LinearGradient,
    width: f32,
    height: f32,
) -> Option<tiny_skia::Shader<'static>> {
    let (sin, cos) = (gradient.angle_deg.to_radians() as f32).sin_cos();
    let half = ((width * sin).abs() + (height * cos).abs()) / 2.0;
    let (cx, cy) = (width / 2.0, height / 2.0);
    let (dx, dy) = (sin * half, -cos * half);

    tiny_skia::LinearGradient::new(
        tiny_skia::Point::from_xy(cx - dx, cy - dy),
        tiny_skia::Point::from_xy(cx + dx, cy + dy),
        vec![
            tiny_skia::GradientStop::new(0.0, skia_color(gradient.from)),
            tiny_skia::GradientStop::new(1.0, skia_color(gradient.to)),
        ],
        tiny_skia::SpreadMode::Pad,
        tiny_skia::Transform::identity(),
    )
}

/// Rectangle from the origin with circular corners, radius clamped to fit.
fn rounded_rect(width: f32, height: f32, radius: f32) -> Option<tiny_skia::Path> {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    if r <= 0.0 {
        let rect = tiny_skia::Rect::from_xywh(0.0, 0.0, width, height)?;
        return Some(tiny_skia::PathBuilder::from_rect(rect));
    }

    let k = r * KAPPA;
    let (w, h) = (width, height);
    let mut pb = tiny_skia::PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(w - r, 0.0);
    pb.cubic_to(w - r + k, 0.0, w, r - k, w, r);
    pb.line_to(w, h - r);
    pb.cubic_to(w, h - r + k, w - r + k, h, w - r, h);
    pb.line_to(r, h);
    pb.cubic_to(r - k, h, 0.0, h - r + k, 0.0, h - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}
