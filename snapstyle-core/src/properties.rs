//! Property editing for the active object.
//!
//! Every setter works on the current selection, fails with
//! [`SceneError::NoSelection`] when there is none, and re-renders and notifies
//! on success.
//!
//! Opacity is not uniform across kinds: images and arrows use whole-object
//! opacity, while rectangles, circles and text keep it in the fill color's
//! alpha channel so their outline stays fully opaque.

use crate::color::{Color, Paint};
use crate::effects::{EffectSettings, ShadowPlacement};
use crate::geometry::{ArrowStyle, Point};
use crate::object::{FontWeight, Outline, TextAlign, TextStyle, FONT_FAMILIES};
use crate::tool::SHAPE_STROKE;
use crate::{
    EditorSession, ObjectId, ObjectKind, ObjectKindTag, SceneError, SceneObject, SceneResult,
};

fn unsupported(operation: &'static str, obj: &SceneObject) -> SceneError {
    SceneError::Unsupported {
        operation,
        kind: obj.kind_tag(),
    }
}

fn positive(name: &str, value: f64) -> SceneResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SceneError::InvalidValue(format!("{name} must be > 0, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> SceneResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SceneError::InvalidValue(format!("{name} must be >= 0, got {value}")))
    }
}

fn has_outline(obj: &SceneObject) -> bool {
    matches!(
        obj.kind,
        ObjectKind::Rectangle { .. } | ObjectKind::Ellipse { .. }
    )
}

fn is_arrow(obj: &SceneObject) -> bool {
    obj.kind_tag() == ObjectKindTag::Arrow
}

impl EditorSession {
    /// The active object.
    #[must_use]
    pub fn selected(&self) -> Option<&SceneObject> {
        self.scene().selected()
    }

    /// Apply `edit` to the active object, then render and notify.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] or whatever `edit` returns.
    pub fn edit_selected<R>(
        &mut self,
        edit: impl FnOnce(&mut SceneObject) -> SceneResult<R>,
    ) -> SceneResult<R> {
        let obj = self
            .surface_mut()
            .scene_mut()
            .selected_mut()
            .ok_or(SceneError::NoSelection)?;
        let result = edit(obj)?;
        self.commit();
        Ok(result)
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut TextStyle) -> SceneResult<()>) -> SceneResult<()> {
        self.edit_selected(|obj| {
            let kind = obj.kind_tag();
            match &mut obj.kind {
                ObjectKind::Text(style) => edit(style),
                _ => Err(SceneError::Unsupported {
                    operation: "text styling",
                    kind,
                }),
            }
        })
    }

    // ==================== transform ====================

    /// Rendered width and height of the active object.
    #[must_use]
    pub fn selected_size(&self) -> Option<(f64, f64)> {
        self.selected().map(SceneObject::rendered_size)
    }

    /// Set the rendered width. With `lock_aspect` both scale axes follow.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive width or a zero-width object.
    pub fn set_width(&mut self, width: f64, lock_aspect: bool) -> SceneResult<()> {
        let width = positive("width", width)?;
        self.edit_selected(|obj| {
            let (base_w, _) = obj.base_size();
            let scale = positive("base width", base_w).map(|w| width / w)?;
            obj.scale_x = scale;
            if lock_aspect {
                obj.scale_y = scale;
            }
            obj.sync_clip();
            Ok(())
        })
    }

    /// Set the rendered height. With `lock_aspect` both scale axes follow.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive height or a zero-height object.
    pub fn set_height(&mut self, height: f64, lock_aspect: bool) -> SceneResult<()> {
        let height = positive("height", height)?;
        self.edit_selected(|obj| {
            let (_, base_h) = obj.base_size();
            let scale = positive("base height", base_h).map(|h| height / h)?;
            obj.scale_y = scale;
            if lock_aspect {
                obj.scale_x = scale;
            }
            obj.sync_clip();
            Ok(())
        })
    }

    /// Move the active object.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] when nothing is selected.
    pub fn set_position(&mut self, left: f64, top: f64) -> SceneResult<()> {
        self.edit_selected(|obj| {
            obj.left = left;
            obj.top = top;
            Ok(())
        })
    }

    /// Rotate the active object about its center.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] when nothing is selected.
    pub fn set_rotation(&mut self, degrees: f64) -> SceneResult<()> {
        self.edit_selected(|obj| {
            obj.rotation = degrees.rem_euclid(360.0);
            Ok(())
        })
    }

    // ==================== fill & opacity ====================

    /// Opacity shown by the panel, in percent.
    ///
    /// `None` for shapes and text without a fill.
    #[must_use]
    pub fn selected_opacity(&self) -> Option<f64> {
        let obj = self.selected()?;
        if obj.uses_fill_alpha() {
            obj.fill.color().map(|c| f64::from(c.a) * 100.0)
        } else {
            Some(obj.opacity * 100.0)
        }
    }

    /// Set opacity in percent.
    ///
    /// Shapes and text get a new fill alpha (a no-op when the fill is
    /// `transparent`); images and arrows get whole-object opacity.
    ///
    /// # Errors
    ///
    /// Returns an error for a value outside `0..=100`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_opacity(&mut self, percent: f64) -> SceneResult<()> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(SceneError::InvalidValue(format!(
                "opacity must be within 0..=100, got {percent}"
            )));
        }
        let alpha = percent / 100.0;
        self.edit_selected(|obj| {
            if obj.uses_fill_alpha() {
                if let Paint::Solid(color) = obj.fill {
                    obj.fill = Paint::Solid(color.with_alpha(alpha as f32));
                }
            } else {
                obj.opacity = alpha;
            }
            Ok(())
        })
    }

    /// Set the fill of a shape or text.
    ///
    /// # Errors
    ///
    /// Returns an error for images and arrows.
    pub fn set_fill(&mut self, fill: Paint) -> SceneResult<()> {
        self.edit_selected(|obj| {
            if !obj.uses_fill_alpha() {
                return Err(unsupported("fill", obj));
            }
            obj.fill = fill;
            Ok(())
        })
    }

    /// Switch a shape's fill between `transparent` and the accent color.
    ///
    /// # Errors
    ///
    /// Returns an error for anything but rectangles and circles.
    pub fn toggle_fill(&mut self) -> SceneResult<bool> {
        self.edit_selected(|obj| {
            if !has_outline(obj) {
                return Err(unsupported("fill toggle", obj));
            }
            obj.fill = if obj.fill.is_none() {
                Paint::Solid(SHAPE_STROKE)
            } else {
                Paint::None
            };
            Ok(!obj.fill.is_none())
        })
    }

    // ==================== outline ====================

    /// The user's real outline, even while the glow borrows the stroke.
    #[must_use]
    pub fn selected_outline(&self) -> Option<Outline> {
        self.selected().map(SceneObject::real_outline)
    }

    /// Edit the real outline of objects accepted by `accepts`, mirroring the
    /// result into the sidecar so a later glow round trip restores it.
    fn edit_outline(
        &mut self,
        operation: &'static str,
        accepts: fn(&SceneObject) -> bool,
        edit: impl FnOnce(&mut SceneObject),
    ) -> SceneResult<()> {
        self.edit_selected(|obj| {
            if !accepts(obj) {
                return Err(unsupported(operation, obj));
            }
            if obj.inside_shadow {
                return Err(SceneError::StrokeLocked);
            }
            edit(obj);
            obj.original_outline = Some(Outline {
                stroke: obj.stroke,
                width: obj.stroke_width,
            });
            Ok(())
        })
    }

    /// Set the outline color of a rectangle or circle.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StrokeLocked`] while the glow is inside, and an
    /// error for other kinds.
    pub fn set_stroke_color(&mut self, stroke: Paint) -> SceneResult<()> {
        self.edit_outline("outline color", has_outline, |obj| obj.stroke = stroke)
    }

    /// Set the outline width of a rectangle or circle.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StrokeLocked`] while the glow is inside, and an
    /// error for a negative width or other kinds.
    pub fn set_stroke_width(&mut self, width: f64) -> SceneResult<()> {
        let width = non_negative("stroke width", width)?;
        self.edit_outline("outline width", has_outline, |obj| obj.stroke_width = width)
    }

    /// Set the line color and width of an arrow.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StrokeLocked`] while the glow is inside, and an
    /// error for other kinds or a non-positive width.
    pub fn set_arrow_line(&mut self, color: Color, width: f64) -> SceneResult<()> {
        let width = positive("line width", width)?;
        self.edit_outline("line style", is_arrow, |obj| {
            obj.stroke = Paint::Solid(color);
            obj.stroke_width = width;
        })
    }

    // ==================== corners ====================

    /// Round the corners of an image or rectangle.
    ///
    /// # Errors
    ///
    /// Returns an error for other kinds or a negative radius.
    pub fn set_corner_radius(&mut self, radius: f64) -> SceneResult<()> {
        let radius = non_negative("corner radius", radius)?;
        self.edit_selected(|obj| {
            let kind = obj.kind_tag();
            match &mut obj.kind {
                ObjectKind::Image { corner_radius, .. }
                | ObjectKind::Rectangle { corner_radius, .. } => *corner_radius = radius,
                _ => {
                    return Err(SceneError::Unsupported {
                        operation: "corner radius",
                        kind,
                    })
                }
            }
            obj.sync_clip();
            Ok(())
        })
    }

    // ==================== text ====================

    /// Replace the text content.
    ///
    /// # Errors
    ///
    /// Returns an error unless a text object is selected.
    pub fn set_text(&mut self, text: impl Into<String>) -> SceneResult<()> {
        let text = text.into();
        self.edit_text(|style| {
            style.text = text;
            Ok(())
        })
    }

    /// Pick a font from [`FONT_FAMILIES`].
    ///
    /// # Errors
    ///
    /// Returns an error for fonts outside the list.
    pub fn set_font_family(&mut self, family: &str) -> SceneResult<()> {
        if !FONT_FAMILIES.contains(&family) {
            return Err(SceneError::InvalidValue(format!("unknown font {family:?}")));
        }
        self.edit_text(|style| {
            style.font_family = family.to_string();
            Ok(())
        })
    }

    /// Set the font size in pixels.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive size.
    pub fn set_font_size(&mut self, size: f64) -> SceneResult<()> {
        let size = positive("font size", size)?;
        self.edit_text(|style| {
            style.font_size = size;
            Ok(())
        })
    }

    /// Set the font weight.
    ///
    /// # Errors
    ///
    /// Returns an error unless a text object is selected.
    pub fn set_font_weight(&mut self, weight: FontWeight) -> SceneResult<()> {
        self.edit_text(|style| {
            style.font_weight = weight;
            Ok(())
        })
    }

    /// Turn italics on or off.
    ///
    /// # Errors
    ///
    /// Returns an error unless a text object is selected.
    pub fn set_italic(&mut self, italic: bool) -> SceneResult<()> {
        self.edit_text(|style| {
            style.italic = italic;
            Ok(())
        })
    }

    /// Turn underline on or off.
    ///
    /// # Errors
    ///
    /// Returns an error unless a text object is selected.
    pub fn set_underline(&mut self, underline: bool) -> SceneResult<()> {
        self.edit_text(|style| {
            style.underline = underline;
            Ok(())
        })
    }

    /// Set the alignment.
    ///
    /// # Errors
    ///
    /// Returns an error unless a text object is selected.
    pub fn set_text_align(&mut self, align: TextAlign) -> SceneResult<()> {
        self.edit_text(|style| {
            style.text_align = align;
            Ok(())
        })
    }

    /// Set the line height multiplier.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive value.
    pub fn set_line_height(&mut self, line_height: f64) -> SceneResult<()> {
        let line_height = positive("line height", line_height)?;
        self.edit_text(|style| {
            style.line_height = line_height;
            Ok(())
        })
    }

    /// Set the highlight behind the glyphs.
    ///
    /// # Errors
    ///
    /// Returns an error unless a text object is selected.
    pub fn set_text_background(&mut self, background: Paint) -> SceneResult<()> {
        self.edit_text(|style| {
            style.background = background;
            Ok(())
        })
    }

    // ==================== arrows ====================

    /// Change which ends carry heads.
    ///
    /// The arrow is rebuilt from its two endpoints as a new object at the same
    /// layer position and center, keeping its paint, transform and effects,
    /// and the new object is selected. Returns the new ID.
    ///
    /// # Errors
    ///
    /// Returns an error unless an arrow is selected.
    pub fn set_arrow_style(&mut self, style: ArrowStyle) -> SceneResult<ObjectId> {
        let old = self.selected().ok_or(SceneError::NoSelection)?;
        let ObjectKind::Arrow {
            style: current, ..
        } = &old.kind
        else {
            return Err(unsupported("arrow style", old));
        };
        if *current == style {
            return Ok(old.id);
        }
        let (start, end) = old
            .arrow_endpoints()
            .ok_or_else(|| SceneError::InvalidValue("arrow path has no shaft".to_string()))?;

        let mut rebuilt = SceneObject::arrow(start, end, style);
        rebuilt.fill = old.fill;
        rebuilt.stroke = old.stroke;
        rebuilt.stroke_width = old.stroke_width;
        rebuilt.stroke_uniform = old.stroke_uniform;
        rebuilt.scale_x = old.scale_x;
        rebuilt.scale_y = old.scale_y;
        rebuilt.rotation = old.rotation;
        rebuilt.opacity = old.opacity;
        rebuilt.visible = old.visible;
        rebuilt.shadow = old.shadow;
        rebuilt.inside_shadow = old.inside_shadow;
        rebuilt.original_outline = old.original_outline;
        rebuilt.set_center(old.center());

        let old_id = old.id;
        let new_id = rebuilt.id;
        self.surface_mut().scene_mut().replace(old_id, rebuilt)?;
        self.surface_mut().set_active(Some(new_id))?;
        tracing::debug!(%old_id, %new_id, ?style, "arrow rebuilt");
        self.commit();
        Ok(new_id)
    }

    /// Arrow endpoints of the active arrow, in canvas coordinates.
    #[must_use]
    pub fn selected_arrow_endpoints(&self) -> Option<(Point, Point)> {
        let obj = self.selected()?;
        let (start, end) = obj.arrow_endpoints()?;
        let bounds = obj.path_bounds()?;
        let shift = |p: Point| Point::new(p.x - bounds.min_x + obj.left, p.y - bounds.min_y + obj.top);
        Some((shift(start), shift(end)))
    }

    // ==================== shadow & glow ====================

    /// Current effect on the active object.
    #[must_use]
    pub fn selected_effect(&self) -> Option<EffectSettings> {
        self.selected().and_then(SceneObject::effect)
    }

    /// Add the default shadow or remove the current effect.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] when nothing is selected.
    pub fn toggle_shadow(&mut self) -> SceneResult<bool> {
        self.edit_selected(|obj| Ok(obj.toggle_shadow()))
    }

    /// Move the effect inside or outside.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] when nothing is selected.
    pub fn set_shadow_placement(&mut self, placement: ShadowPlacement) -> SceneResult<()> {
        self.edit_selected(|obj| {
            obj.set_shadow_placement(placement);
            Ok(())
        })
    }

    /// Blur slider.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative blur or when there is no effect.
    pub fn set_shadow_blur(&mut self, blur: f64) -> SceneResult<()> {
        self.edit_selected(|obj| obj.set_effect_blur(blur))
    }

    /// Color picker.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no effect.
    pub fn set_shadow_color(&mut self, color: Color) -> SceneResult<()> {
        self.edit_selected(|obj| obj.set_effect_color(color))
    }

    /// Offset sliders.
    ///
    /// # Errors
    ///
    /// Returns an error while inside or when there is no shadow.
    pub fn set_shadow_offset(&mut self, offset_x: f64, offset_y: f64) -> SceneResult<()> {
        self.edit_selected(|obj| obj.set_shadow_offset(offset_x, offset_y))
    }

    /// Remove the shadow or glow.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] when nothing is selected.
    pub fn remove_shadow(&mut self) -> SceneResult<()> {
        self.edit_selected(|obj| {
            obj.remove_effect();
            Ok(())
        })
    }

    // ==================== layers ====================

    /// Move the active object one step up.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] when nothing is selected.
    pub fn bring_selected_forward(&mut self) -> SceneResult<()> {
        let id = self.scene().selected_id().ok_or(SceneError::NoSelection)?;
        self.bring_forward(id)
    }

    /// Move the active object one step down.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] when nothing is selected.
    pub fn send_selected_backward(&mut self) -> SceneResult<()> {
        let id = self.scene().selected_id().ok_or(SceneError::NoSelection)?;
        self.send_backward(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RasterImage;

    fn session_with(obj: SceneObject) -> (EditorSession, ObjectId) {
        let mut session = EditorSession::default();
        let id = session.add_object(obj);
        session.select(Some(id)).expect("select");
        (session, id)
    }

    #[test]
    fn test_width_with_and_without_lock() {
        let (mut session, _) = session_with(SceneObject::rectangle(200.0, 100.0));
        session.set_width(400.0, true).expect("width");
        assert_eq!(session.selected_size(), Some((400.0, 200.0)));
        session.set_width(100.0, false).expect("width");
        assert_eq!(session.selected_size(), Some((100.0, 200.0)));
        assert!(session.set_width(0.0, true).is_err());
    }

    #[test]
    fn test_opacity_on_image_is_whole_object() {
        let (mut session, _) = session_with(SceneObject::image(RasterImage::transparent(4, 4)));
        session.set_opacity(40.0).expect("opacity");
        let img = session.selected().expect("image");
        assert!((img.opacity - 0.4).abs() < 1e-9);
        assert!(session.set_fill(Paint::Solid(Color::BLACK)).is_err());
    }

    #[test]
    fn test_opacity_without_fill_is_noop() {
        let (mut session, _) = session_with(SceneObject::ellipse(10.0));
        session.set_opacity(30.0).expect("opacity");
        let circle = session.selected().expect("circle");
        assert_eq!(circle.fill, Paint::None);
        assert_eq!(circle.opacity, 1.0);
        assert_eq!(session.selected_opacity(), None);
    }

    #[test]
    fn test_stroke_edits_are_mirrored_and_locked_inside() {
        let (mut session, _) = session_with(SceneObject::rectangle(10.0, 10.0));
        session.set_stroke_color(Paint::Solid(Color::rgb(9, 9, 9))).expect("color");
        session.set_stroke_width(4.0).expect("width");
        let outline = session.selected().expect("rect").original_outline.expect("sidecar");
        assert_eq!(outline.width, 4.0);

        session.toggle_shadow().expect("shadow");
        session.set_shadow_placement(ShadowPlacement::Inside).expect("inside");
        assert!(matches!(session.set_stroke_width(1.0), Err(SceneError::StrokeLocked)));
        assert_eq!(session.selected_outline().map(|o| o.width), Some(4.0));
    }

    #[test]
    fn test_corner_radius_kinds() {
        let (mut session, _) = session_with(SceneObject::image(RasterImage::transparent(8, 6)));
        session.set_corner_radius(3.0).expect("radius");
        assert!(matches!(
            session.selected().expect("image").kind,
            ObjectKind::Image { clip: Some(_), .. }
        ));

        let (mut session, _) = session_with(SceneObject::text("x"));
        assert!(matches!(
            session.set_corner_radius(3.0),
            Err(SceneError::Unsupported { kind: ObjectKindTag::Text, .. })
        ));
    }

    #[test]
    fn test_text_setters_validate() {
        let (mut session, _) = session_with(SceneObject::text("hello"));
        session.set_font_family("Georgia").expect("font");
        assert!(session.set_font_family("Comic Sans MS").is_err());
        assert!(session.set_font_size(0.0).is_err());
        session.set_font_weight(FontWeight::Bold).expect("weight");
        session.set_text_align(TextAlign::Center).expect("align");
        let style = session.selected().and_then(SceneObject::text_style).expect("style");
        assert_eq!(style.font_family, "Georgia");
        assert_eq!(style.font_weight.value(), 700);
    }

    #[test]
    fn test_arrow_style_rebuild_keeps_center_and_index() {
        let mut session = EditorSession::default();
        let below = session.add_object(SceneObject::rectangle(5.0, 5.0));
        let mut arrow = SceneObject::arrow(
            Point::new(100.0, 100.0),
            Point::new(300.0, 200.0),
            ArrowStyle::End,
        );
        arrow.rotation = 30.0;
        arrow.opacity = 0.5;
        let old = session.add_object(arrow);
        session.add_object(SceneObject::rectangle(5.0, 5.0));
        session.select(Some(old)).expect("select");
        let center = session.selected().expect("arrow").center();

        let new_id = session.set_arrow_style(ArrowStyle::Both).expect("style");
        assert_ne!(new_id, old);
        assert_eq!(session.scene().index_of(new_id), Some(1));
        assert_eq!(session.scene().index_of(below), Some(0));
        assert_eq!(session.scene().selected_id(), Some(new_id));

        let rebuilt = session.selected().expect("rebuilt");
        let moved = rebuilt.center().distance(center);
        assert!(moved < 1e-9, "center moved by {moved}");
        assert_eq!((rebuilt.rotation, rebuilt.opacity), (30.0, 0.5));
        assert!(matches!(rebuilt.kind, ObjectKind::Arrow { style: ArrowStyle::Both, .. }));
    }

    #[test]
    fn test_edit_without_selection() {
        let mut session = EditorSession::default();
        assert!(matches!(session.set_opacity(50.0), Err(SceneError::NoSelection)));
        assert!(matches!(
            session.set_arrow_style(ArrowStyle::None),
            Err(SceneError::NoSelection)
        ));
    }
}
