//! Z-order, visibility and deletion of scene objects.
//!
//! Paint order is authoritative: the list returned by [`Scene::layers`] is
//! simply paint order reversed, so the top row is the object painted last.

use serde::Serialize;

use crate::{ArrowStyle, ObjectId, ObjectKind, ObjectKindTag, Scene, SceneObject, SceneResult};

/// Longest text excerpt shown as a layer label.
const LABEL_CHARS: usize = 24;

/// One row of the layer list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEntry {
    /// Object ID.
    pub id: ObjectId,
    /// Object kind.
    pub kind: ObjectKindTag,
    /// Human-readable label.
    pub label: String,
    /// Whether the object is painted.
    pub visible: bool,
    /// Whether this is the current selection.
    pub selected: bool,
}

fn label_for(obj: &SceneObject) -> String {
    match &obj.kind {
        ObjectKind::Text(style) => {
            let first = style.text.lines().next().unwrap_or_default();
            let mut label: String = first.chars().take(LABEL_CHARS).collect();
            if first.chars().count() > LABEL_CHARS {
                label.push_str("...");
            }
            label
        }
        ObjectKind::Arrow { style, .. } if *style == ArrowStyle::None => "Line".to_string(),
        ObjectKind::Arrow { .. } => "Arrow".to_string(),
        ObjectKind::Image { .. } => "Image".to_string(),
        ObjectKind::Rectangle { .. } => "Rectangle".to_string(),
        ObjectKind::Ellipse { .. } => "Circle".to_string(),
    }
}

impl Scene {
    /// Layer rows from top (painted last) to bottom.
    #[must_use]
    pub fn layers(&self) -> Vec<LayerEntry> {
        let selected = self.selected_id();
        self.objects()
            .iter()
            .rev()
            .map(|obj| LayerEntry {
                id: obj.id,
                kind: obj.kind_tag(),
                label: label_for(obj),
                visible: obj.visible,
                selected: selected == Some(obj.id),
            })
            .collect()
    }

    /// Move an object one step toward the top.
    ///
    /// Returns `false` when it was already on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn bring_forward(&mut self, id: ObjectId) -> SceneResult<bool> {
        let index = self.require_index(id)?;
        if index + 1 >= self.len() {
            return Ok(false);
        }
        self.objects_mut().swap(index, index + 1);
        Ok(true)
    }

    /// Move an object one step toward the bottom.
    ///
    /// Returns `false` when it was already at the bottom.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn send_backward(&mut self, id: ObjectId) -> SceneResult<bool> {
        let index = self.require_index(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.objects_mut().swap(index, index - 1);
        Ok(true)
    }

    /// Move an object to a paint-order index (clamped), shifting the others.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn move_to_index(&mut self, id: ObjectId, index: usize) -> SceneResult<()> {
        let from = self.require_index(id)?;
        let objects = self.objects_mut();
        let obj = objects.remove(from);
        let to = index.min(objects.len());
        objects.insert(to, obj);
        Ok(())
    }

    /// Show or hide an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> SceneResult<()> {
        let index = self.require_index(id)?;
        self.objects_mut()[index].visible = visible;
        Ok(())
    }

    /// Flip visibility, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn toggle_visible(&mut self, id: ObjectId) -> SceneResult<bool> {
        let index = self.require_index(id)?;
        let obj = &mut self.objects_mut()[index];
        obj.visible = !obj.visible;
        Ok(obj.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> (Scene, [ObjectId; 3]) {
        let mut scene = Scene::new();
        let a = scene.add(SceneObject::rectangle(1.0, 1.0));
        let b = scene.add(SceneObject::ellipse(1.0));
        let c = scene.add(SceneObject::text("top"));
        (scene, [a, b, c])
    }

    #[test]
    fn test_layers_are_reverse_paint_order() {
        let (scene, [a, b, c]) = three();
        let ids: Vec<ObjectId> = scene.layers().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![c, b, a]);
        assert_eq!(scene.layers()[0].label, "top");
    }

    #[test]
    fn test_bring_forward_stops_at_top() {
        let (mut scene, [a, _, _]) = three();
        assert!(scene.bring_forward(a).expect("forward"));
        assert!(scene.bring_forward(a).expect("forward"));
        assert!(!scene.bring_forward(a).expect("forward"));
        assert_eq!(scene.index_of(a), Some(2));
    }

    #[test]
    fn test_send_backward_stops_at_bottom() {
        let (mut scene, [a, _, c]) = three();
        assert!(!scene.send_backward(a).expect("backward"));
        scene.send_backward(c).expect("backward");
        assert_eq!(scene.index_of(c), Some(1));
    }

    #[test]
    fn test_move_to_index_clamps() {
        let (mut scene, [a, b, c]) = three();
        scene.move_to_index(a, 99).expect("move");
        let order: Vec<ObjectId> = scene.objects().iter().map(|o| o.id).collect();
        assert_eq!(order, vec![b, c, a]);
    }

    #[test]
    fn test_visibility_toggle() {
        let (mut scene, [a, _, _]) = three();
        assert!(!scene.toggle_visible(a).expect("toggle"));
        assert!(!scene.layers()[2].visible);
        scene.set_visible(a, true).expect("show");
        assert!(scene.get(a).expect("object").visible);
    }
}
