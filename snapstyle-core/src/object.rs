//! Scene objects - the building blocks of a composition.
//!
//! Every object shares a base of transform, paint and effect attributes; the
//! variant-specific fields live in [`ObjectKind`].
//!
//! Transform convention: `left`/`top` is the unrotated top-left corner of the
//! scaled box, and rotation (degrees, clockwise) and scale both apply about the
//! box center.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::{Color, Paint};
use crate::geometry::{self, ArrowStyle, Bounds, PathCommand, Point};
use crate::raster::RasterImage;

/// Extra slop, in canvas pixels, when hit testing thin arrow paths.
const ARROW_HIT_TOLERANCE: f64 = 4.0;

/// Average glyph advance as a fraction of the font size, used for text extents.
const GLYPH_ADVANCE: f64 = 0.6;

/// Fonts the text panel offers.
pub const FONT_FAMILIES: &[&str] = &[
    "Inter",
    "Roboto",
    "Poppins",
    "Montserrat",
    "Playfair Display",
    "Fira Code",
    "Arial",
    "Georgia",
    "Courier New",
];

/// Unique identifier for a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conventional drop shadow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    /// Shadow color (alpha carries the strength).
    pub color: Color,
    /// Blur radius, `>= 0`.
    pub blur: f64,
    /// Horizontal offset.
    pub offset_x: f64,
    /// Vertical offset.
    pub offset_y: f64,
}

impl Shadow {
    /// Create a shadow with the given color and blur and no offset.
    #[must_use]
    pub fn new(color: Color, blur: f64) -> Self {
        Self {
            color,
            blur: blur.max(0.0),
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Set the offsets.
    #[must_use]
    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

/// A stroke color and width pair, remembered while the stroke is borrowed by
/// the inside glow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Stroke paint.
    pub stroke: Paint,
    /// Stroke width.
    pub width: f64,
}

/// Rounded clip rectangle in the object's local (unscaled) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    /// Clip width.
    pub width: f64,
    /// Clip height.
    pub height: f64,
    /// Corner radius.
    pub radius: f64,
}

/// Font weight choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// 300.
    Light,
    /// 400.
    #[default]
    Normal,
    /// 500.
    Medium,
    /// 600.
    Semibold,
    /// 700.
    Bold,
    /// 800.
    Extrabold,
}

impl FontWeight {
    /// Numeric CSS weight.
    #[must_use]
    pub fn value(self) -> u16 {
        match self {
            Self::Light => 300,
            Self::Normal => 400,
            Self::Medium => 500,
            Self::Semibold => 600,
            Self::Bold => 700,
            Self::Extrabold => 800,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Text content and typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// The text; `\n` separates lines.
    pub text: String,
    /// Font family, one of [`FONT_FAMILIES`].
    pub font_family: String,
    /// Font size in pixels, `> 0`.
    pub font_size: f64,
    /// Weight.
    pub font_weight: FontWeight,
    /// Italic on/off.
    pub italic: bool,
    /// Underline on/off.
    pub underline: bool,
    /// Alignment.
    pub text_align: TextAlign,
    /// Line height multiplier, `> 0`.
    pub line_height: f64,
    /// Highlight painted behind the glyphs.
    pub background: Paint,
}

impl TextStyle {
    /// Approximate extents of the laid-out text.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn extents(&self) -> (f64, f64) {
        let lines: Vec<&str> = self.text.split('\n').collect();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = longest as f64 * self.font_size * GLYPH_ADVANCE;
        let height = lines.len() as f64 * self.font_size * self.line_height;
        (width, height)
    }
}

/// The variant-specific part of a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    /// An uploaded or generated raster image.
    Image {
        /// Decoded pixels.
        #[serde(skip)]
        image: RasterImage,
        /// Corner rounding radius in on-canvas pixels, realized through `clip`.
        corner_radius: f64,
        /// Clip geometry; always matches the image size when present.
        clip: Option<ClipRect>,
    },
    /// A rectangle with native corner radii.
    Rectangle {
        /// Unscaled width.
        width: f64,
        /// Unscaled height.
        height: f64,
        /// Corner radius.
        corner_radius: f64,
    },
    /// A circle described by its radius.
    Ellipse {
        /// Radius.
        radius: f64,
    },
    /// A text block.
    Text(TextStyle),
    /// An arrow or plain line.
    Arrow {
        /// Path commands in path space; the first two are the shaft.
        commands: Vec<PathCommand>,
        /// Which ends carry heads.
        style: ArrowStyle,
    },
}

/// Kind of an object, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKindTag {
    /// [`ObjectKind::Image`].
    Image,
    /// [`ObjectKind::Rectangle`].
    Rectangle,
    /// [`ObjectKind::Ellipse`].
    Ellipse,
    /// [`ObjectKind::Text`].
    Text,
    /// [`ObjectKind::Arrow`].
    Arrow,
}

impl fmt::Display for ObjectKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Image => "image",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Text => "text",
            Self::Arrow => "arrow",
        })
    }
}

/// One editable element of the composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Left edge of the unrotated, scaled box.
    pub left: f64,
    /// Top edge of the unrotated, scaled box.
    pub top: f64,
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Rotation in degrees about the center.
    pub rotation: f64,
    /// Whole-object opacity; only images expose it in the property editor.
    pub opacity: f64,
    /// Whether the object is painted.
    pub visible: bool,
    /// Whether the default select/move behavior can pick it.
    pub selectable: bool,
    /// Whether it receives pointer events at all.
    pub evented: bool,
    /// Fill; for shapes and text its alpha is the fill opacity.
    pub fill: Paint,
    /// Stroke paint.
    pub stroke: Paint,
    /// Stroke width, `>= 0`.
    pub stroke_width: f64,
    /// Keep stroke width constant under scaling.
    pub stroke_uniform: bool,
    /// Drop shadow, if any.
    pub shadow: Option<Shadow>,
    /// When set, `stroke`/`stroke_width` render an inner glow and `shadow` is `None`.
    pub inside_shadow: bool,
    /// The user's real outline, captured when the glow borrowed the stroke.
    pub original_outline: Option<Outline>,
    /// Variant data.
    pub kind: ObjectKind,
}

impl SceneObject {
    /// Create an object of the given kind at the origin with neutral styling.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            selectable: true,
            evented: true,
            fill: Paint::None,
            stroke: Paint::None,
            stroke_width: 0.0,
            stroke_uniform: false,
            shadow: None,
            inside_shadow: false,
            original_outline: None,
            kind,
        }
    }

    /// An image object showing `image` at its natural size.
    #[must_use]
    pub fn image(image: RasterImage) -> Self {
        Self::new(ObjectKind::Image {
            image,
            corner_radius: 0.0,
            clip: None,
        })
    }

    /// A rectangle.
    #[must_use]
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Rectangle {
            width,
            height,
            corner_radius: 0.0,
        })
    }

    /// A circle with the given radius.
    #[must_use]
    pub fn ellipse(radius: f64) -> Self {
        Self::new(ObjectKind::Ellipse { radius })
    }

    /// A text block with default typography.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ObjectKind::Text(TextStyle {
            text: content.into(),
            font_family: FONT_FAMILIES[0].to_string(),
            font_size: 24.0,
            font_weight: FontWeight::Normal,
            italic: false,
            underline: false,
            text_align: TextAlign::Left,
            line_height: 1.16,
            background: Paint::None,
        }))
    }

    /// An arrow from `start` to `end`, positioned so its path bounds land
    /// where the points are on the canvas.
    #[must_use]
    pub fn arrow(start: Point, end: Point, style: ArrowStyle) -> Self {
        let commands =
            geometry::compute_arrow_heads(start, end, style, geometry::DEFAULT_HEAD_LENGTH);
        let bounds = geometry::path_bounds(&commands);
        let mut obj = Self::new(ObjectKind::Arrow { commands, style });
        obj.left = bounds.min_x;
        obj.top = bounds.min_y;
        obj
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Set fill and stroke.
    #[must_use]
    pub fn with_paint(mut self, fill: Paint, stroke: Paint, stroke_width: f64) -> Self {
        self.fill = fill;
        self.stroke = stroke;
        self.stroke_width = stroke_width;
        self
    }

    /// Set the drop shadow.
    #[must_use]
    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Kind tag.
    #[must_use]
    pub fn kind_tag(&self) -> ObjectKindTag {
        match self.kind {
            ObjectKind::Image { .. } => ObjectKindTag::Image,
            ObjectKind::Rectangle { .. } => ObjectKindTag::Rectangle,
            ObjectKind::Ellipse { .. } => ObjectKindTag::Ellipse,
            ObjectKind::Text(_) => ObjectKindTag::Text,
            ObjectKind::Arrow { .. } => ObjectKindTag::Arrow,
        }
    }

    /// Whether fill opacity lives in the fill color's alpha channel.
    #[must_use]
    pub fn uses_fill_alpha(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Rectangle { .. } | ObjectKind::Ellipse { .. } | ObjectKind::Text(_)
        )
    }

    /// Bounds of an arrow's commands in path space.
    #[must_use]
    pub fn path_bounds(&self) -> Option<Bounds> {
        match &self.kind {
            ObjectKind::Arrow { commands, .. } => Some(geometry::path_bounds(commands)),
            _ => None,
        }
    }

    /// Unscaled width and height.
    #[must_use]
    pub fn base_size(&self) -> (f64, f64) {
        match &self.kind {
            ObjectKind::Image { image, .. } => (f64::from(image.width()), f64::from(image.height())),
            ObjectKind::Rectangle { width, height, .. } => (*width, *height),
            ObjectKind::Ellipse { radius } => (radius * 2.0, radius * 2.0),
            ObjectKind::Text(style) => style.extents(),
            ObjectKind::Arrow { commands, .. } => {
                let b = geometry::path_bounds(commands);
                (b.width(), b.height())
            }
        }
    }

    /// Width and height as rendered, i.e. including scale.
    #[must_use]
    pub fn rendered_size(&self) -> (f64, f64) {
        let (w, h) = self.base_size();
        (w * self.scale_x.abs(), h * self.scale_y.abs())
    }

    /// Center of the scaled box; invariant under rotation.
    #[must_use]
    pub fn center(&self) -> Point {
        let (w, h) = self.rendered_size();
        Point::new(self.left + w / 2.0, self.top + h / 2.0)
    }

    /// Move so that the center lands on `center`.
    pub fn set_center(&mut self, center: Point) {
        let (w, h) = self.rendered_size();
        self.left = center.x - w / 2.0;
        self.top = center.y - h / 2.0;
    }

    /// Map a canvas point into the object's unscaled local space.
    #[must_use]
    pub fn to_local(&self, p: Point) -> Option<Point> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return None;
        }
        let (w, h) = self.base_size();
        let c = self.center();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let dx = p.x - c.x;
        let dy = p.y - c.y;
        let rx = dx * cos + dy * sin;
        let ry = -dx * sin + dy * cos;
        Some(Point::new(rx / self.scale_x + w / 2.0, ry / self.scale_y + h / 2.0))
    }

    /// Whether a canvas point falls on the object.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        let Some(local) = self.to_local(p) else {
            return false;
        };
        let (w, h) = self.base_size();
        let slop = match self.kind {
            ObjectKind::Arrow { .. } => ARROW_HIT_TOLERANCE / self.scale_x.abs().max(f64::EPSILON),
            _ => 0.0,
        };
        local.x >= -slop && local.x <= w + slop && local.y >= -slop && local.y <= h + slop
    }

    /// Corner radius for rounded kinds.
    #[must_use]
    pub fn corner_radius(&self) -> Option<f64> {
        match self.kind {
            ObjectKind::Image { corner_radius, .. } | ObjectKind::Rectangle { corner_radius, .. } => {
                Some(corner_radius)
            }
            _ => None,
        }
    }

    /// Recompute an image's clip from its current size, radius and glow mode.
    ///
    /// A clip exists when the image is rounded or the inside glow needs its
    /// stroke kept within the bounds; otherwise it is cleared. The radius is
    /// on-canvas pixels, so the clip divides it by the horizontal scale.
    pub fn sync_clip(&mut self) {
        let inside = self.inside_shadow;
        let (w, h) = self.base_size();
        let scale = self.scale_x.abs();
        if let ObjectKind::Image {
            corner_radius,
            clip,
            ..
        } = &mut self.kind
        {
            let radius = if scale > 0.0 {
                *corner_radius / scale
            } else {
                *corner_radius
            };
            *clip = (*corner_radius > 0.0 || inside).then_some(ClipRect {
                width: w,
                height: h,
                radius,
            });
        }
    }

    /// The outline the user actually chose, whether or not the glow is borrowing
    /// the stroke right now.
    #[must_use]
    pub fn real_outline(&self) -> Outline {
        if self.inside_shadow {
            self.original_outline.unwrap_or(Outline {
                stroke: Paint::None,
                width: 0.0,
            })
        } else {
            Outline {
                stroke: self.stroke,
                width: self.stroke_width,
            }
        }
    }

    /// Text style, for text objects.
    #[must_use]
    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.kind {
            ObjectKind::Text(style) => Some(style),
            _ => None,
        }
    }

    /// Image pixels, for image objects.
    #[must_use]
    pub fn raster(&self) -> Option<&RasterImage> {
        match &self.kind {
            ObjectKind::Image { image, .. } => Some(image),
            _ => None,
        }
    }

    /// Arrow endpoints in path space, for arrow objects.
    #[must_use]
    pub fn arrow_endpoints(&self) -> Option<(Point, Point)> {
        match &self.kind {
            ObjectKind::Arrow { commands, .. } => geometry::arrow_endpoints(commands),
            _ => None,
        }
    }
}
