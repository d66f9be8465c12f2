//! The editor session: one surface, one frame style, one tool, one selection.
//!
//! Every mutating operation applies its change, re-renders the surface and
//! emits [`SceneEvent::SceneChanged`] before returning.

use crate::event::{PointerEvent, SceneEvent};
use crate::frame::{fit_within, FrameStyle, Template};
use crate::geometry::Point;
use crate::layers::LayerEntry;
use crate::tool::{DrawingTool, ToolKind, ToolState};
use crate::{
    Color, EditorConfig, ObjectId, ObjectKindTag, Paint, RasterImage, Scene, SceneError,
    SceneObject, SceneResult, Surface, SurfaceBackend,
};

/// Text given to new text objects.
pub const DEFAULT_TEXT: &str = "Double click to edit";

/// Owns all editing state for one composition.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    surface: Surface,
    frame: FrameStyle,
    tool: DrawingTool,
    has_content: bool,
    ai_busy: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Create a headless session.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let surface = Surface::new(config.default_width, config.default_height);
        Self::from_surface(config, surface)
    }

    /// Create a session drawing through `backend`.
    #[must_use]
    pub fn with_backend(config: EditorConfig, backend: Box<dyn SurfaceBackend>) -> Self {
        let surface = Surface::with_backend(config.default_width, config.default_height, backend);
        Self::from_surface(config, surface)
    }

    fn from_surface(config: EditorConfig, surface: Surface) -> Self {
        Self {
            config,
            surface,
            frame: FrameStyle::default(),
            tool: DrawingTool::new(),
            has_content: false,
            ai_busy: false,
        }
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The surface.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The surface, mutably (viewport changes, backend swaps).
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.surface.scene()
    }

    /// Frame style.
    #[must_use]
    pub fn frame(&self) -> &FrameStyle {
        &self.frame
    }

    /// Drawing tool state.
    #[must_use]
    pub fn tool_state(&self) -> ToolState {
        self.tool.state()
    }

    /// Logical content size.
    #[must_use]
    pub fn content_size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    /// Register a subscriber.
    pub fn subscribe(&mut self, listener: impl FnMut(&SceneEvent) + 'static) {
        self.surface.subscribe(listener);
    }

    /// Re-render and tell subscribers the scene changed.
    pub(crate) fn commit(&mut self) {
        self.surface.render();
        self.surface.emit(SceneEvent::SceneChanged);
    }

    /// Feed a host pointer event to the tool or the default surface behavior.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> SceneResult<()> {
        if self.tool.handle(&mut self.surface, event)? {
            self.commit();
        }
        Ok(())
    }

    /// Arm a drawing tool, or disarm it if it is already armed.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn select_tool(&mut self, kind: ToolKind) -> SceneResult<()> {
        self.tool.select_tool(&mut self.surface, kind)?;
        self.commit();
        Ok(())
    }

    /// Return the tool to idle.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn cancel_tool(&mut self) -> SceneResult<()> {
        self.tool.disarm(&mut self.surface)?;
        self.commit();
        Ok(())
    }

    /// Change the active object.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not in the scene.
    pub fn select(&mut self, id: Option<ObjectId>) -> SceneResult<()> {
        self.surface.set_active(id)?;
        self.surface.render();
        Ok(())
    }

    /// Add an uploaded image.
    ///
    /// The first image sizes the content area to its natural size, capped to
    /// the configured maximum, and fills it. Later images are centered at a
    /// fraction of the fit scale, each one offset a little further.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn add_image(&mut self, image: RasterImage) -> SceneResult<ObjectId> {
        let natural = (image.width(), image.height());
        if natural.0 == 0 || natural.1 == 0 {
            return Err(SceneError::InvalidValue("image has no pixels".to_string()));
        }
        self.tool.disarm(&mut self.surface)?;

        if !self.has_content {
            let capped = fit_within(
                natural,
                (self.config.max_content_width, self.config.max_content_height),
            );
            let (w, h) = self.frame.content_size(capped.0, capped.1);
            self.surface.resize(w, h);
            self.has_content = true;
        }

        let (cw, ch) = (f64::from(self.surface.width()), f64::from(self.surface.height()));
        let (nw, nh) = (f64::from(natural.0), f64::from(natural.1));
        let fit = (cw / nw).min(ch / nh);
        let existing = self
            .scene()
            .objects()
            .iter()
            .filter(|o| o.kind_tag() == ObjectKindTag::Image)
            .count();

        let mut obj = SceneObject::image(image).with_shadow(self.frame.image_shadow());
        #[allow(clippy::cast_precision_loss)]
        let (scale, offset) = if existing == 0 {
            (fit, 0.0)
        } else {
            (
                fit.min(1.0) * self.config.secondary_scale,
                self.config.cascade_offset * existing as f64,
            )
        };
        obj.scale_x = scale;
        obj.scale_y = scale;
        obj.set_center(Point::new(cw / 2.0 + offset, ch / 2.0 + offset));

        let id = self.surface.add(obj);
        self.surface.set_active(Some(id))?;
        tracing::debug!(%id, width = natural.0, height = natural.1, "image added");
        self.commit();
        Ok(id)
    }

    /// Add several uploads in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failure.
    pub fn add_images(
        &mut self,
        images: impl IntoIterator<Item = RasterImage>,
    ) -> SceneResult<Vec<ObjectId>> {
        images.into_iter().map(|img| self.add_image(img)).collect()
    }

    /// Add a text object on top and select it.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn add_text(&mut self) -> SceneResult<ObjectId> {
        self.tool.disarm(&mut self.surface)?;
        let text = SceneObject::text(DEFAULT_TEXT)
            .with_position(100.0, 100.0)
            .with_paint(Paint::Solid(Color::WHITE), Paint::None, 0.0);
        let id = self.surface.add(text);
        self.surface.set_active(Some(id))?;
        self.commit();
        Ok(id)
    }

    /// Add an arbitrary object on top.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let id = self.surface.add(object);
        self.commit();
        id
    }

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn delete(&mut self, id: ObjectId) -> SceneResult<()> {
        self.surface.remove(id)?;
        self.commit();
        Ok(())
    }

    /// Delete the active object.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoSelection`] when nothing is selected.
    pub fn delete_selected(&mut self) -> SceneResult<()> {
        let id = self.scene().selected_id().ok_or(SceneError::NoSelection)?;
        self.delete(id)
    }

    /// Swap an object for another at the same paint-order index.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not in the scene.
    pub fn replace(&mut self, id: ObjectId, object: SceneObject) -> SceneResult<ObjectId> {
        let was_selected = self.scene().selected_id() == Some(id);
        let new_id = object.id;
        self.surface.scene_mut().replace(id, object)?;
        if was_selected {
            self.surface.emit(SceneEvent::SelectionChanged(None));
        }
        self.commit();
        Ok(new_id)
    }

    /// Clear the scene and restore the default frame and size.
    pub fn reset(&mut self) {
        let had_selection = self.scene().selected_id().is_some();
        self.state_reset();
        if had_selection {
            self.surface.emit(SceneEvent::SelectionChanged(None));
        }
        tracing::debug!("session reset");
        self.commit();
    }

    fn state_reset(&mut self) {
        self.tool = DrawingTool::new();
        self.surface.cancel_drag();
        self.surface.scene_mut().clear();
        self.surface
            .resize(self.config.default_width, self.config.default_height);
        self.frame = FrameStyle::default();
        self.has_content = false;
    }

    /// Replace the frame style with a template over the defaults.
    pub fn apply_template(&mut self, template: &Template) {
        tracing::debug!(template = %template.name, "template applied");
        self.frame = FrameStyle::from_template(template);
        self.commit();
    }

    /// Replace the frame style.
    ///
    /// # Errors
    ///
    /// Returns an error if the style is out of range; nothing changes then.
    pub fn set_frame(&mut self, frame: FrameStyle) -> SceneResult<()> {
        frame.validate()?;
        if let (Some(w), Some(h)) = (frame.custom_width, frame.custom_height) {
            self.surface.resize(w, h);
        }
        self.frame = frame;
        self.commit();
        Ok(())
    }

    /// Edit the frame style in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the edited style is out of range; nothing changes then.
    pub fn update_frame(&mut self, edit: impl FnOnce(&mut FrameStyle)) -> SceneResult<()> {
        let mut frame = self.frame.clone();
        edit(&mut frame);
        self.set_frame(frame)
    }

    /// Resize the content area, as the drag handles do.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty size.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> SceneResult<()> {
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidValue(format!(
                "canvas size must be positive, got {width}x{height}"
            )));
        }
        self.frame.custom_width = Some(width);
        self.frame.custom_height = Some(height);
        self.surface.resize(width, height);
        self.has_content = true;
        self.commit();
        Ok(())
    }

    /// Layer rows, top first.
    #[must_use]
    pub fn layers(&self) -> Vec<LayerEntry> {
        self.scene().layers()
    }

    /// Move an object one step up.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn bring_forward(&mut self, id: ObjectId) -> SceneResult<()> {
        if self.surface.bring_forward(id)? {
            self.commit();
        }
        Ok(())
    }

    /// Move an object one step down.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn send_backward(&mut self, id: ObjectId) -> SceneResult<()> {
        if self.surface.send_backward(id)? {
            self.commit();
        }
        Ok(())
    }

    /// Move an object to a paint-order index.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn move_to_index(&mut self, id: ObjectId, index: usize) -> SceneResult<()> {
        self.surface.move_to_index(id, index)?;
        self.commit();
        Ok(())
    }

    /// Show or hide an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> SceneResult<()> {
        self.surface.scene_mut().set_visible(id, visible)?;
        self.commit();
        Ok(())
    }

    /// Flip an object's visibility.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn toggle_visible(&mut self, id: ObjectId) -> SceneResult<bool> {
        let visible = self.surface.scene_mut().toggle_visible(id)?;
        self.commit();
        Ok(visible)
    }

    /// Rasterize the content at `multiplier`.
    ///
    /// # Errors
    ///
    /// Propagates backend errors.
    pub fn rasterize_content(&self, multiplier: f64) -> SceneResult<RasterImage> {
        self.surface.to_raster(multiplier)
    }

    /// Whether an AI request is in flight.
    #[must_use]
    pub fn is_ai_busy(&self) -> bool {
        self.ai_busy
    }

    /// Claim the AI slot. Returns `false` if a request is already running.
    pub fn begin_ai_request(&mut self) -> bool {
        if self.ai_busy {
            return false;
        }
        self.ai_busy = true;
        true
    }

    /// Release the AI slot.
    pub fn end_ai_request(&mut self) {
        self.ai_busy = false;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_first_image_sets_capped_size() {
        let mut session = EditorSession::default();
        let id = session
            .add_image(RasterImage::transparent(2000, 1000))
            .expect("add");
        assert_eq!(session.content_size(), (1000, 500));
        let img = session.scene().get(id).expect("image");
        assert_eq!(img.rendered_size(), (1000.0, 500.0));
        assert_eq!((img.left, img.top), (0.0, 0.0));
        assert_eq!(session.scene().selected_id(), Some(id));
        assert!(img.shadow.is_some());
    }

    #[test]
    fn test_secondary_images_cascade() {
        let mut session = EditorSession::default();
        session.add_image(RasterImage::transparent(1000, 500)).expect("first");
        let second = session.add_image(RasterImage::transparent(500, 250)).expect("second");
        let third = session.add_image(RasterImage::transparent(500, 250)).expect("third");

        let a = session.scene().get(second).expect("second").center();
        let b = session.scene().get(third).expect("third").center();
        assert_eq!(a, Point::new(520.0, 270.0));
        assert_eq!(b, Point::new(540.0, 290.0));
        let (w, _) = session.scene().get(second).expect("second").rendered_size();
        assert!((w - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_mutation_notifies() {
        let mut session = EditorSession::default();
        let changes = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&changes);
        session.subscribe(move |e| {
            if *e == SceneEvent::SceneChanged {
                *sink.borrow_mut() += 1;
            }
        });

        session.add_text().expect("text");
        session.delete_selected().expect("delete");
        session.reset();
        assert_eq!(*changes.borrow(), 3);
        assert_eq!(session.surface().frame_count(), 3);
    }

    #[test]
    fn test_delete_without_selection() {
        let mut session = EditorSession::default();
        assert!(matches!(session.delete_selected(), Err(SceneError::NoSelection)));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = EditorSession::default();
        session.add_image(RasterImage::transparent(300, 200)).expect("add");
        session.update_frame(|f| f.padding = 10.0).expect("frame");
        session.reset();
        assert!(session.scene().is_empty());
        assert_eq!(session.content_size(), (800, 600));
        assert_eq!(session.frame(), &FrameStyle::default());
    }

    #[test]
    fn test_ai_slot_gates_reentry() {
        let mut session = EditorSession::default();
        assert!(session.begin_ai_request());
        assert!(!session.begin_ai_request());
        session.end_ai_request();
        assert!(!session.is_ai_busy());
    }
}
