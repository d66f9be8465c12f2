//! Scene to SVG translation.
//!
//! Each visible object becomes a group placed with the same transform the
//! editor uses for hit testing: scale and rotation apply about the center of
//! the scaled box, so the object's own markup lives in its unscaled local
//! space `[0, w] x [0, h]`. Drop shadows are wrapped around that group in
//! canvas space so their offset is not rotated with the object.

use std::fmt::Write;

use snapstyle_core::geometry::{self, Point};
use snapstyle_core::{ObjectKind, Paint, Scene, SceneObject, TextAlign, TextStyle};

use crate::error::RenderResult;
use crate::href_cache::ImageHrefCache;

/// Horizontal advance per character used to size text highlights.
const GLYPH_ADVANCE: f64 = 0.6;

/// Render the scene content to a standalone SVG document.
///
/// The document is `width` x `height` logical pixels with a transparent
/// background. Hidden objects are skipped.
///
/// # Errors
///
/// Returns an error if an embedded image cannot be encoded.
pub fn scene_to_svg(scene: &Scene, width: u32, height: u32) -> RenderResult<String> {
    scene_to_svg_cached(scene, width, height, &mut ImageHrefCache::new())
}

/// Like [`scene_to_svg`], reusing image data URIs from `hrefs`.
///
/// Entries for objects that have left the scene are dropped afterwards.
///
/// # Errors
///
/// Returns an error if an embedded image cannot be encoded.
pub fn scene_to_svg_cached(
    scene: &Scene,
    width: u32,
    height: u32,
    hrefs: &mut ImageHrefCache,
) -> RenderResult<String> {
    let mut svg = String::with_capacity(1024);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );

    let mut defs = String::new();
    let mut body = String::new();
    for (index, object) in scene.objects().iter().enumerate() {
        if !object.visible {
            continue;
        }
        render_object_svg(&mut defs, &mut body, index, object, (width, height), hrefs)?;
    }
    hrefs.retain_scene(scene);

    if !defs.is_empty() {
        let _ = write!(svg, "<defs>{defs}</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    Ok(svg)
}

fn render_object_svg(
    defs: &mut String,
    body: &mut String,
    index: usize,
    object: &SceneObject,
    (width, height): (u32, u32),
    hrefs: &mut ImageHrefCache,
) -> RenderResult<()> {
    let (w, h) = object.base_size();
    let center = object.center();

    let _ = write!(body, "<g opacity=\"{}\"", object.opacity.clamp(0.0, 1.0));
    if let Some(shadow) = &object.shadow {
        let id = format!("shadow-{index}");
        let (fw, fh) = (f64::from(width), f64::from(height));
        let _ = write!(
            defs,
            "<filter id=\"{id}\" filterUnits=\"userSpaceOnUse\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"><feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\" flood-opacity=\"{}\"/></filter>",
            -fw,
            -fh,
            fw * 3.0,
            fh * 3.0,
            shadow.offset_x,
            shadow.offset_y,
            shadow.blur.max(0.0) / 2.0,
            shadow.color.to_hex(),
            shadow.color.a,
        );
        let _ = write!(body, " filter=\"url(#{id})\"");
    }
    let _ = write!(
        body,
        "><g transform=\"translate({} {}) rotate({}) scale({} {}) translate({} {})\">",
        center.x,
        center.y,
        object.rotation,
        object.scale_x,
        object.scale_y,
        -w / 2.0,
        -h / 2.0,
    );

    let stroke = stroke_attrs(object);
    match &object.kind {
        ObjectKind::Image { image, clip, .. } => {
            let href = hrefs.href(object.id, image)?;
            if let Some(clip) = clip {
                let id = format!("clip-{index}");
                let _ = write!(
                    defs,
                    "<clipPath id=\"{id}\"><rect width=\"{}\" height=\"{}\" rx=\"{r}\" ry=\"{r}\"/></clipPath>",
                    clip.width,
                    clip.height,
                    r = clip.radius,
                );
                let _ = write!(body, "<g clip-path=\"url(#{id})\">");
            }
            let _ = write!(
                body,
                "<image width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" xlink:href=\"{href}\"/>",
            );
            if !stroke.is_empty() {
                let r = clip.as_ref().map_or(0.0, |c| c.radius);
                let _ = write!(
                    body,
                    "<rect width=\"{w}\" height=\"{h}\" rx=\"{r}\" ry=\"{r}\" fill=\"none\"{stroke}/>",
                );
            }
            if clip.is_some() {
                body.push_str("</g>");
            }
        }

        ObjectKind::Rectangle {
            width,
            height,
            corner_radius,
        } => {
            let _ = write!(
                body,
                "<rect width=\"{width}\" height=\"{height}\" rx=\"{r}\" ry=\"{r}\"{}{stroke}/>",
                paint_attrs("fill", object.fill),
                r = corner_radius,
            );
        }

        ObjectKind::Ellipse { radius } => {
            let _ = write!(
                body,
                "<circle cx=\"{radius}\" cy=\"{radius}\" r=\"{radius}\"{}{stroke}/>",
                paint_attrs("fill", object.fill),
            );
        }

        ObjectKind::Text(style) => render_text_svg(body, style, object.fill, &stroke, w),

        ObjectKind::Arrow { commands, .. } => {
            let bounds = geometry::path_bounds(commands);
            let d = geometry::to_svg_path(commands, Point::new(bounds.min_x, bounds.min_y));
            let _ = write!(
                body,
                "<path d=\"{d}\" fill=\"none\" stroke-linecap=\"round\" stroke-linejoin=\"round\"{stroke}/>",
            );
        }
    }

    body.push_str("</g></g>");
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn render_text_svg(body: &mut String, style: &TextStyle, fill: Paint, stroke: &str, width: f64) {
    let size = style.font_size;
    let line_step = size * style.line_height;
    let (anchor, x) = match style.text_align {
        TextAlign::Left => ("start", 0.0),
        TextAlign::Center => ("middle", width / 2.0),
        TextAlign::Right => ("end", width),
    };

    if let Some(color) = style.background.color() {
        for (i, line) in style.text.split('\n').enumerate() {
            let line_width = line.chars().count() as f64 * size * GLYPH_ADVANCE;
            let lx = match style.text_align {
                TextAlign::Left => 0.0,
                TextAlign::Center => (width - line_width) / 2.0,
                TextAlign::Right => width - line_width,
            };
            let _ = write!(
                body,
                "<rect x=\"{lx}\" y=\"{}\" width=\"{line_width}\" height=\"{line_step}\"{}/>",
                i as f64 * line_step,
                paint_attrs("fill", Paint::Solid(color)),
            );
        }
    }

    let _ = write!(
        body,
        "<text font-family=\"{}\" font-size=\"{size}\" font-weight=\"{}\" font-style=\"{}\" text-anchor=\"{anchor}\"{}{}{stroke}>",
        escape_xml(&style.font_family),
        style.font_weight.value(),
        if style.italic { "italic" } else { "normal" },
        if style.underline {
            " text-decoration=\"underline\""
        } else {
            ""
        },
        paint_attrs("fill", fill),
    );
    for (i, line) in style.text.split('\n').enumerate() {
        // Baseline sits one font size below the top of the line box.
        let y = i as f64 * line_step + size;
        let _ = write!(body, "<tspan x=\"{x}\" y=\"{y}\">{}</tspan>", escape_xml(line));
    }
    body.push_str("</text>");
}

/// Stroke attributes, or an empty string when nothing is stroked.
///
/// Uniform strokes are divided by the mean scale so they keep their on-screen
/// width after the group's scale is applied.
fn stroke_attrs(object: &SceneObject) -> String {
    if object.stroke.is_none() || object.stroke_width <= 0.0 {
        return String::new();
    }
    let mut width = object.stroke_width;
    if object.stroke_uniform {
        let mean = (object.scale_x.abs() + object.scale_y.abs()) / 2.0;
        if mean > f64::EPSILON {
            width /= mean;
        }
    }
    format!(
        "{} stroke-width=\"{width}\"",
        paint_attrs("stroke", object.stroke)
    )
}

fn paint_attrs(name: &str, paint: Paint) -> String {
    match paint {
        Paint::None => format!(" {name}=\"none\""),
        Paint::Solid(color) if color.is_opaque() => format!(" {name}=\"{}\"", color.to_hex()),
        Paint::Solid(color) => format!(
            " {name}=\"{}\" {name}-opacity=\"{}\"",
            color.to_hex(),
            color.a
        ),
    }
}

/// Escape special XML characters.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
