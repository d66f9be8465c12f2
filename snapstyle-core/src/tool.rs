//! Drawing tools: pointer gestures that create rectangles, circles and arrows.
//!
//! | State | pointer down | pointer move | pointer up |
//! |-------|--------------|--------------|------------|
//! | `Idle` | default select/move | default drag | default drop |
//! | `Armed(kind)` | place a placeholder, start drawing | ignored | ignored |
//! | `Drawing` | ignored | resize the live object | finalize or discard, back to `Idle` |
//!
//! While a tool is armed every existing object is made non-selectable and
//! non-evented so a stray press cannot drag it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{Color, Paint};
use crate::event::{PointerEvent, PointerPhase};
use crate::geometry::{self, ArrowStyle, PathCommand, Point};
use crate::{ObjectId, ObjectKind, SceneObject, SceneResult, Surface};

/// Default outline color of drawn shapes.
pub const SHAPE_STROKE: Color = Color::rgb(0x63, 0x66, 0xf1);

/// Shapes a drawing tool can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Drag out a rectangle.
    Rectangle,
    /// Drag out a circle.
    Ellipse,
    /// Drag out an arrow.
    Arrow,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Arrow => "arrow",
        })
    }
}

/// Where the drawing state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// No tool; pointer input goes to the surface's default behavior.
    #[default]
    Idle,
    /// A tool is armed and waiting for a press.
    Armed(ToolKind),
    /// A shape is being dragged out.
    Drawing {
        /// Tool in use.
        kind: ToolKind,
        /// Canvas point where the press happened.
        anchor: Point,
        /// Placeholder object following the pointer.
        live: ObjectId,
    },
}

impl ToolState {
    /// The armed or drawing tool, if any.
    #[must_use]
    pub fn active_tool(&self) -> Option<ToolKind> {
        match self {
            Self::Idle => None,
            Self::Armed(kind) | Self::Drawing { kind, .. } => Some(*kind),
        }
    }
}

/// Styling given to freshly drawn objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill of rectangles and circles.
    pub fill: Paint,
    /// Outline (and arrow) color.
    pub stroke: Paint,
    /// Outline (and arrow) width.
    pub stroke_width: f64,
    /// Corner radius of new rectangles.
    pub rect_corner_radius: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Paint::None,
            stroke: Paint::Solid(SHAPE_STROKE),
            stroke_width: 3.0,
            rect_corner_radius: 4.0,
        }
    }
}

/// What a completed gesture produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Nothing happened (no gesture in progress).
    Ignored,
    /// The gesture is still in progress.
    InProgress,
    /// A new object was committed and selected.
    Created(ObjectId),
    /// The gesture was too small to keep.
    Discarded,
}

/// The drawing tool state machine.
#[derive(Debug, Clone, Default)]
pub struct DrawingTool {
    state: ToolState,
    style: ShapeStyle,
    last: Option<Point>,
}

impl DrawingTool {
    /// Create an idle tool with default shape styling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Styling for new shapes.
    #[must_use]
    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    /// Change the styling for new shapes.
    pub fn set_style(&mut self, style: ShapeStyle) {
        self.style = style;
    }

    /// Arm `kind`, or return to idle if `kind` is already armed.
    ///
    /// # Errors
    ///
    /// Propagates surface errors when clearing the selection.
    pub fn select_tool(&mut self, surface: &mut Surface, kind: ToolKind) -> SceneResult<()> {
        if self.state.active_tool() == Some(kind) {
            return self.disarm(surface);
        }
        self.drop_live(surface)?;
        tracing::debug!(tool = %kind, "tool armed");
        self.state = ToolState::Armed(kind);
        surface.cancel_drag();
        surface.scene_mut().set_interactive(false);
        surface.set_active(None)
    }

    /// Return to idle, dropping any half-drawn object.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn disarm(&mut self, surface: &mut Surface) -> SceneResult<()> {
        self.drop_live(surface)?;
        if self.state != ToolState::Idle {
            tracing::debug!("tool disarmed");
        }
        self.state = ToolState::Idle;
        surface.scene_mut().set_interactive(true);
        Ok(())
    }

    fn drop_live(&mut self, surface: &mut Surface) -> SceneResult<()> {
        if let ToolState::Drawing { live, .. } = self.state {
            if surface.scene().contains(live) {
                surface.remove(live)?;
            }
        }
        self.last = None;
        Ok(())
    }

    /// Route a pointer event through the state machine.
    ///
    /// Returns `true` when the scene was mutated.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn handle(&mut self, surface: &mut Surface, event: PointerEvent) -> SceneResult<bool> {
        if self.state == ToolState::Idle {
            return surface.handle_pointer(event);
        }
        let p = surface.to_local(event.position());
        match event.phase {
            PointerPhase::Down => Ok(self.pointer_down(surface, p).is_some()),
            PointerPhase::Move => Ok(self.pointer_move(surface, p)),
            PointerPhase::Up => {
                self.pointer_move(surface, p);
                Ok(self.pointer_up(surface)? != DrawOutcome::Ignored)
            }
        }
    }

    /// Start drawing at canvas point `p` if a tool is armed.
    pub fn pointer_down(&mut self, surface: &mut Surface, p: Point) -> Option<ObjectId> {
        let ToolState::Armed(kind) = self.state else {
            return None;
        };
        let mut placeholder = match kind {
            ToolKind::Rectangle => {
                let mut rect = SceneObject::rectangle(0.0, 0.0);
                if let ObjectKind::Rectangle { corner_radius, .. } = &mut rect.kind {
                    *corner_radius = self.style.rect_corner_radius;
                }
                rect.with_paint(self.style.fill, self.style.stroke, self.style.stroke_width)
            }
            ToolKind::Ellipse => SceneObject::ellipse(0.0).with_paint(
                self.style.fill,
                self.style.stroke,
                self.style.stroke_width,
            ),
            ToolKind::Arrow => SceneObject::arrow(p, p, ArrowStyle::None).with_paint(
                Paint::None,
                self.style.stroke,
                self.style.stroke_width,
            ),
        }
        .with_position(p.x, p.y);
        placeholder.stroke_uniform = true;
        placeholder.selectable = false;
        placeholder.evented = false;

        let live = surface.add(placeholder);
        tracing::debug!(tool = %kind, x = p.x, y = p.y, "drawing started");
        self.state = ToolState::Drawing {
            kind,
            anchor: p,
            live,
        };
        self.last = Some(p);
        Some(live)
    }

    /// Update the live object from the anchor to canvas point `p`.
    ///
    /// Returns `false` (and does nothing) unless a shape is being drawn.
    pub fn pointer_move(&mut self, surface: &mut Surface, p: Point) -> bool {
        let ToolState::Drawing { anchor, live, .. } = self.state else {
            return false;
        };
        let Some(obj) = surface.scene_mut().get_mut(live) else {
            return false;
        };
        let corner = anchor.min(p);
        match &mut obj.kind {
            ObjectKind::Rectangle { width, height, .. } => {
                *width = (p.x - anchor.x).abs();
                *height = (p.y - anchor.y).abs();
            }
            ObjectKind::Ellipse { radius } => {
                *radius = anchor.distance(p) / 2.0;
            }
            ObjectKind::Arrow { commands, .. } => {
                *commands = vec![PathCommand::Move { to: anchor }, PathCommand::Line { to: p }];
            }
            _ => return false,
        }
        obj.left = corner.x;
        obj.top = corner.y;
        self.last = Some(p);
        true
    }

    /// Finish the gesture.
    ///
    /// Rectangles and circles are kept and selected. Arrows are rebuilt with
    /// an end head, or discarded when shorter than
    /// [`geometry::MIN_ARROW_LENGTH`]. The tool then returns to idle.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn pointer_up(&mut self, surface: &mut Surface) -> SceneResult<DrawOutcome> {
        let ToolState::Drawing { kind, anchor, live } = self.state else {
            return Ok(DrawOutcome::Ignored);
        };
        let end = self.last.unwrap_or(anchor);
        self.last = None;
        self.state = ToolState::Idle;
        surface.scene_mut().set_interactive(true);

        let committed = match kind {
            ToolKind::Rectangle | ToolKind::Ellipse => Some(live),
            ToolKind::Arrow => {
                let shaft = surface.remove(live)?;
                if geometry::is_degenerate_arrow(anchor, end) {
                    tracing::debug!(
                        length = anchor.distance(end),
                        "arrow too short, discarded"
                    );
                    None
                } else {
                    let mut arrow = SceneObject::arrow(anchor, end, ArrowStyle::End)
                        .with_paint(Paint::None, shaft.stroke, shaft.stroke_width);
                    arrow.stroke_uniform = true;
                    Some(surface.add(arrow))
                }
            }
        };

        match committed {
            Some(id) => {
                surface.set_active(Some(id))?;
                tracing::debug!(tool = %kind, %id, "drawing committed");
                Ok(DrawOutcome::Created(id))
            }
            None => Ok(DrawOutcome::Discarded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(tool: &mut DrawingTool, surface: &mut Surface, from: Point, to: Point) -> DrawOutcome {
        tool.pointer_down(surface, from).expect("placeholder");
        tool.pointer_move(surface, to);
        tool.pointer_up(surface).expect("pointer up")
    }

    #[test]
    fn test_select_tool_toggles() {
        let mut surface = Surface::new(800, 600);
        let mut tool = DrawingTool::new();
        tool.select_tool(&mut surface, ToolKind::Rectangle).expect("arm");
        assert_eq!(tool.state(), ToolState::Armed(ToolKind::Rectangle));
        tool.select_tool(&mut surface, ToolKind::Rectangle).expect("toggle");
        assert_eq!(tool.state(), ToolState::Idle);
    }

    #[test]
    fn test_arming_locks_existing_objects() {
        let mut surface = Surface::new(800, 600);
        let existing = surface.add(SceneObject::rectangle(10.0, 10.0));
        surface.set_active(Some(existing)).expect("select");
        let mut tool = DrawingTool::new();

        tool.select_tool(&mut surface, ToolKind::Ellipse).expect("arm");
        let obj = surface.scene().get(existing).expect("object");
        assert!(!obj.selectable && !obj.evented);
        assert_eq!(surface.scene().selected_id(), None);

        tool.disarm(&mut surface).expect("disarm");
        assert!(surface.scene().get(existing).expect("object").selectable);
    }

    #[test]
    fn test_rectangle_uses_min_corner() {
        let mut surface = Surface::new(800, 600);
        let mut tool = DrawingTool::new();
        tool.select_tool(&mut surface, ToolKind::Rectangle).expect("arm");
        let outcome = drag(&mut tool, &mut surface, Point::new(300.0, 250.0), Point::new(100.0, 100.0));
        let DrawOutcome::Created(id) = outcome else {
            panic!("expected a rectangle, got {outcome:?}");
        };
        let rect = surface.scene().get(id).expect("rect");
        assert_eq!((rect.left, rect.top), (100.0, 100.0));
        assert_eq!(rect.base_size(), (200.0, 150.0));
        assert!(rect.selectable);
        assert_eq!(surface.scene().selected_id(), Some(id));
        assert_eq!(tool.state(), ToolState::Idle);
    }

    #[test]
    fn test_ellipse_radius_is_half_distance() {
        let mut surface = Surface::new(800, 600);
        let mut tool = DrawingTool::new();
        tool.select_tool(&mut surface, ToolKind::Ellipse).expect("arm");
        let DrawOutcome::Created(id) =
            drag(&mut tool, &mut surface, Point::new(10.0, 10.0), Point::new(40.0, 50.0))
        else {
            panic!("expected a circle");
        };
        let circle = surface.scene().get(id).expect("circle");
        assert!(matches!(circle.kind, ObjectKind::Ellipse { radius } if (radius - 25.0).abs() < 1e-9));
        assert_eq!((circle.left, circle.top), (10.0, 10.0));
    }

    #[test]
    fn test_arrow_gets_end_head() {
        let mut surface = Surface::new(800, 600);
        let mut tool = DrawingTool::new();
        tool.select_tool(&mut surface, ToolKind::Arrow).expect("arm");
        let DrawOutcome::Created(id) =
            drag(&mut tool, &mut surface, Point::new(10.0, 10.0), Point::new(110.0, 10.0))
        else {
            panic!("expected an arrow");
        };
        assert_eq!(surface.scene().len(), 1);
        let arrow = surface.scene().get(id).expect("arrow");
        match &arrow.kind {
            ObjectKind::Arrow { commands, style } => {
                assert_eq!(*style, ArrowStyle::End);
                assert_eq!(commands.len(), 6);
            }
            other => panic!("expected arrow, got {other:?}"),
        }
    }

    #[test]
    fn test_short_arrow_discarded() {
        let mut surface = Surface::new(800, 600);
        let mut tool = DrawingTool::new();
        tool.select_tool(&mut surface, ToolKind::Arrow).expect("arm");
        let outcome = drag(&mut tool, &mut surface, Point::new(10.0, 10.0), Point::new(10.0, 12.0));
        assert_eq!(outcome, DrawOutcome::Discarded);
        assert!(surface.scene().is_empty());
        assert_eq!(tool.state(), ToolState::Idle);
    }

    #[test]
    fn test_move_without_drawing_is_noop() {
        let mut surface = Surface::new(800, 600);
        let mut tool = DrawingTool::new();
        assert!(!tool.pointer_move(&mut surface, Point::new(5.0, 5.0)));
        tool.select_tool(&mut surface, ToolKind::Rectangle).expect("arm");
        assert!(!tool.pointer_move(&mut surface, Point::new(5.0, 5.0)));
        assert_eq!(tool.pointer_up(&mut surface).expect("up"), DrawOutcome::Ignored);
    }
}
