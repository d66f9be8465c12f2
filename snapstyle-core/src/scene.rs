//! Ordered scene model.
//!
//! The scene is a single list of objects in paint order: index 0 is painted
//! first (bottom), the last index is painted last (top). Layer operations in
//! [`crate::layers`] rearrange this list; the renderer walks it front to back.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::{ObjectId, ObjectKindTag, SceneError, SceneObject, SceneResult};

/// All objects of a composition plus the current selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Objects in paint order (bottom first).
    objects: Vec<SceneObject>,
    /// The single selected object, if any.
    selected: Option<ObjectId>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object on top of everything else.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Insert an object at a paint-order index, clamped to the valid range.
    pub fn insert_at(&mut self, index: usize, object: SceneObject) -> ObjectId {
        let id = object.id;
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        id
    }

    /// Remove an object, clearing the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn remove(&mut self, id: ObjectId) -> SceneResult<SceneObject> {
        let index = self.require_index(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.objects.remove(index))
    }

    /// Swap in a new object at the same paint-order index as `id`.
    ///
    /// The selection is cleared if it pointed at the replaced object.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not in the scene.
    pub fn replace(&mut self, id: ObjectId, object: SceneObject) -> SceneResult<SceneObject> {
        let index = self.require_index(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(std::mem::replace(&mut self.objects[index], object))
    }

    /// Paint-order index of an object.
    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub(crate) fn require_index(&self, id: ObjectId) -> SceneResult<usize> {
        self.index_of(id)
            .ok_or_else(|| SceneError::ObjectNotFound(id.to_string()))
    }

    /// Whether the object is in the scene.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    /// Get an object by ID.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Objects in paint order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> &mut Vec<SceneObject> {
        &mut self.objects
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every object and the selection.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.selected = None;
    }

    /// Topmost visible, evented object under a canvas point.
    #[must_use]
    pub fn object_at(&self, p: Point) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.visible && o.evented && o.contains_point(p))
            .map(|o| o.id)
    }

    /// The image added (or moved) highest in paint order.
    #[must_use]
    pub fn most_recent_image(&self) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.kind_tag() == ObjectKindTag::Image)
            .map(|o| o.id)
    }

    /// Select an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn select(&mut self, id: ObjectId) -> SceneResult<()> {
        self.require_index(id)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Selected object ID.
    #[must_use]
    pub fn selected_id(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Selected object.
    #[must_use]
    pub fn selected(&self) -> Option<&SceneObject> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Selected object, mutably.
    pub fn selected_mut(&mut self) -> Option<&mut SceneObject> {
        let id = self.selected?;
        self.get_mut(id)
    }

    /// Toggle `selectable`/`evented` on every object at once.
    pub fn set_interactive(&mut self, interactive: bool) {
        for obj in &mut self.objects {
            obj.selectable = interactive;
            obj.evented = interactive;
        }
    }

    /// Serialize the scene to JSON. Image pixels are not included.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string(self).map_err(SceneError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        serde_json::from_str(json).map_err(SceneError::Serialization)
    }
}
