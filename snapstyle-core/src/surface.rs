//! Canvas surface: the scene plus the drawing capability it is shown through.
//!
//! The surface owns the ordered scene, the logical content size, the viewport
//! mapping from host pointer coordinates to canvas coordinates, and the list of
//! subscribers. Z-order operations are forwarded to the scene's layer
//! methods, so paint order and hit testing share one list. Actual pixel work is delegated to a [`SurfaceBackend`]; the
//! renderer crate provides the real one, [`HeadlessBackend`] is used when no
//! pixels are needed.

use std::fmt;

use crate::event::{PointerEvent, PointerPhase, SceneEvent};
use crate::geometry::Point;
use crate::{ObjectId, RasterImage, Scene, SceneError, SceneObject, SceneResult};

/// Pixel capability behind a [`Surface`].
pub trait SurfaceBackend {
    /// Show the current scene. Called on every render.
    fn present(&mut self, _scene: &Scene, _width: u32, _height: u32) {}

    /// Rasterize the scene content alone, transparent where nothing is drawn,
    /// at `multiplier` times the logical size.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce pixels.
    fn rasterize(
        &self,
        scene: &Scene,
        width: u32,
        height: u32,
        multiplier: f64,
    ) -> SceneResult<RasterImage>;
}

/// Backend that draws nothing and rasterizes to a transparent buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessBackend;

impl SurfaceBackend for HeadlessBackend {
    fn rasterize(
        &self,
        _scene: &Scene,
        width: u32,
        height: u32,
        multiplier: f64,
    ) -> SceneResult<RasterImage> {
        let (w, h) = scaled_size(width, height, multiplier)?;
        Ok(RasterImage::transparent(w, h))
    }
}

/// Pixel size of a logical size at a resolution multiplier.
///
/// # Errors
///
/// Returns an error for a non-positive multiplier or an empty result.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_size(width: u32, height: u32, multiplier: f64) -> SceneResult<(u32, u32)> {
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return Err(SceneError::InvalidValue(format!(
            "multiplier must be positive, got {multiplier}"
        )));
    }
    let w = (f64::from(width) * multiplier).round() as u32;
    let h = (f64::from(height) * multiplier).round() as u32;
    if w == 0 || h == 0 {
        return Err(SceneError::Raster(format!("empty raster {w}x{h}")));
    }
    Ok((w, h))
}

/// Subscriber callback.
pub type Listener = Box<dyn FnMut(&SceneEvent)>;

#[derive(Debug, Clone, Copy)]
struct Drag {
    id: ObjectId,
    last: Point,
    moved: bool,
}

/// The live editing surface.
pub struct Surface {
    scene: Scene,
    width: u32,
    height: u32,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    backend: Box<dyn SurfaceBackend>,
    listeners: Vec<Listener>,
    frames: u64,
    drag: Option<Drag>,
}

impl Surface {
    /// Create a headless surface of the given logical size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_backend(width, height, Box::new(HeadlessBackend))
    }

    /// Create a surface drawing through `backend`.
    #[must_use]
    pub fn with_backend(width: u32, height: u32, backend: Box<dyn SurfaceBackend>) -> Self {
        Self {
            scene: Scene::new(),
            width,
            height,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            backend,
            listeners: Vec::new(),
            frames: 0,
            drag: None,
        }
    }

    /// Replace the pixel backend.
    pub fn set_backend(&mut self, backend: Box<dyn SurfaceBackend>) {
        self.backend = backend;
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably. Callers render and notify afterwards.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Objects in paint order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        self.scene.objects()
    }

    /// Logical content width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical content height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Change the logical content size.
    pub fn resize(&mut self, width: u32, height: u32) {
        tracing::debug!(width, height, "surface resized");
        self.width = width;
        self.height = height;
    }

    /// Set the host viewport mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if `zoom` is not positive.
    pub fn set_viewport(&mut self, zoom: f64, pan_x: f64, pan_y: f64) -> SceneResult<()> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(SceneError::InvalidValue(format!("zoom must be positive, got {zoom}")));
        }
        self.zoom = zoom;
        self.pan_x = pan_x;
        self.pan_y = pan_y;
        Ok(())
    }

    /// Map a host pointer position to canvas coordinates.
    #[must_use]
    pub fn to_local(&self, host: Point) -> Point {
        Point::new((host.x - self.pan_x) / self.zoom, (host.y - self.pan_y) / self.zoom)
    }

    /// Register a subscriber for selection, modification and change events.
    pub fn subscribe(&mut self, listener: impl FnMut(&SceneEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Deliver an event to every subscriber.
    pub fn emit(&mut self, event: SceneEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    /// Add an object on top.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        self.scene.add(object)
    }

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn remove(&mut self, id: ObjectId) -> SceneResult<SceneObject> {
        let was_selected = self.scene.selected_id() == Some(id);
        let removed = self.scene.remove(id)?;
        if was_selected {
            self.emit(SceneEvent::SelectionChanged(None));
        }
        Ok(removed)
    }

    /// Move an object one step toward the top of the paint order.
    ///
    /// Returns `false` when it was already on top. Z-order lives in the
    /// scene; see [`Scene::layers`] for the displayed list.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn bring_forward(&mut self, id: ObjectId) -> SceneResult<bool> {
        self.scene.bring_forward(id)
    }

    /// Move an object one step toward the bottom of the paint order.
    ///
    /// Returns `false` when it was already at the bottom.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn send_backward(&mut self, id: ObjectId) -> SceneResult<bool> {
        self.scene.send_backward(id)
    }

    /// Move an object to a paint-order index, clamped to the valid range.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn move_to_index(&mut self, id: ObjectId, index: usize) -> SceneResult<()> {
        self.scene.move_to_index(id, index)
    }

    /// Make `id` the active object, or clear the selection.
    ///
    /// Emits `SelectionChanged` only when the selection actually changes.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not in the scene.
    pub fn set_active(&mut self, id: Option<ObjectId>) -> SceneResult<()> {
        if self.scene.selected_id() == id {
            return Ok(());
        }
        match id {
            Some(id) => self.scene.select(id)?,
            None => self.scene.deselect(),
        }
        self.emit(SceneEvent::SelectionChanged(id));
        Ok(())
    }

    /// Redraw through the backend.
    pub fn render(&mut self) {
        self.frames += 1;
        self.backend.present(&self.scene, self.width, self.height);
    }

    /// Number of renders so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Rasterize the content at `multiplier` times the logical size.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn to_raster(&self, multiplier: f64) -> SceneResult<RasterImage> {
        self.backend
            .rasterize(&self.scene, self.width, self.height, multiplier)
    }

    /// Default select-and-move behavior used while no drawing tool is armed.
    ///
    /// Returns `true` when the scene was mutated.
    ///
    /// # Errors
    ///
    /// Propagates selection errors.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> SceneResult<bool> {
        let p = self.to_local(event.position());
        match event.phase {
            PointerPhase::Down => {
                let hit = self
                    .scene
                    .object_at(p)
                    .filter(|id| self.scene.get(*id).is_some_and(|o| o.selectable));
                self.set_active(hit)?;
                self.drag = hit.map(|id| Drag {
                    id,
                    last: p,
                    moved: false,
                });
                Ok(false)
            }
            PointerPhase::Move => {
                let Some(drag) = self.drag.as_mut() else {
                    return Ok(false);
                };
                let Some(obj) = self.scene.get_mut(drag.id) else {
                    self.drag = None;
                    return Ok(false);
                };
                obj.left += p.x - drag.last.x;
                obj.top += p.y - drag.last.y;
                drag.last = p;
                drag.moved = true;
                Ok(true)
            }
            PointerPhase::Up => match self.drag.take() {
                Some(drag) if drag.moved => {
                    self.emit(SceneEvent::ObjectModified(drag.id));
                    Ok(true)
                }
                _ => Ok(false),
            },
        }
    }

    /// Forget any in-progress drag.
    pub(crate) fn cancel_drag(&mut self) {
        self.drag = None;
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("objects", &self.scene.len())
            .field("listeners", &self.listeners.len())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
