//! Pointer input and scene notifications.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::ObjectId;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved (pressed or not).
    Move,
    /// Button released.
    Up,
}

/// A pointer event in host (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase.
    pub phase: PointerPhase,
    /// X in host coordinates.
    pub x: f64,
    /// Y in host coordinates.
    pub y: f64,
}

impl PointerEvent {
    /// Pointer pressed at `(x, y)`.
    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
        }
    }

    /// Pointer moved to `(x, y)`.
    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
        }
    }

    /// Pointer released at `(x, y)`.
    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Up,
            x,
            y,
        }
    }

    /// Host position as a point.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Notifications emitted synchronously after the scene changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// The active object changed.
    SelectionChanged(Option<ObjectId>),
    /// A drag, scale or rotate of one object completed.
    ObjectModified(ObjectId),
    /// Any mutation; dependent views should resynchronize.
    SceneChanged,
}
