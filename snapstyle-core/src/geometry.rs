//! Geometry primitives and the arrow path builder.
//!
//! Arrows are stored as a flat list of path commands. The first two commands
//! are always the shaft (`MoveTo(start)`, `LineTo(end)`); every command after
//! that belongs to an arrowhead and is ignored when the endpoints are read
//! back.

use std::f64::consts::PI;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Length of each arrowhead stroke, in canvas pixels.
pub const DEFAULT_HEAD_LENGTH: f64 = 20.0;

/// Half-angle of the arrowhead chevron (30 degrees).
pub const HEAD_SWEEP: f64 = PI / 6.0;

/// Shafts shorter than this are treated as accidental clicks.
pub const MIN_ARROW_LENGTH: f64 = 5.0;

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from left).
    pub x: f64,
    /// Y position (pixels from top).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Component-wise minimum (top-left corner of the box spanned by both).
    #[must_use]
    pub fn min(&self, other: Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Translate by a delta.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Bounds {
    /// Width of the bounds.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounds.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }
}

/// A single path command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum PathCommand {
    /// Start a new sub-path.
    Move {
        /// Target point.
        to: Point,
    },
    /// Straight line from the current point.
    Line {
        /// Target point.
        to: Point,
    },
}

impl PathCommand {
    /// The point this command ends at.
    #[must_use]
    pub fn point(&self) -> Point {
        match self {
            Self::Move { to } | Self::Line { to } => *to,
        }
    }
}

/// Which end(s) of an arrow carry a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    /// Plain line.
    None,
    /// Head at the start point.
    Start,
    /// Head at the end point.
    #[default]
    End,
    /// Heads at both ends.
    Both,
}

impl ArrowStyle {
    fn has_start(self) -> bool {
        matches!(self, Self::Start | Self::Both)
    }

    fn has_end(self) -> bool {
        matches!(self, Self::End | Self::Both)
    }
}

fn push_head(commands: &mut Vec<PathCommand>, tip: Point, angle: f64, head_length: f64) {
    for sweep in [-HEAD_SWEEP, HEAD_SWEEP] {
        let a = angle + sweep;
        commands.push(PathCommand::Move { to: tip });
        commands.push(PathCommand::Line {
            to: Point::new(tip.x - head_length * a.cos(), tip.y - head_length * a.sin()),
        });
    }
}

/// Build the full command list for an arrow from `start` to `end`.
///
/// The shaft comes first; each requested head adds two strokes of
/// `head_length` swept 30 degrees either side of the shaft, with the tip on
/// the endpoint. Callers are expected to reject shafts shorter than
/// [`MIN_ARROW_LENGTH`] before building.
#[must_use]
pub fn compute_arrow_heads(
    start: Point,
    end: Point,
    style: ArrowStyle,
    head_length: f64,
) -> Vec<PathCommand> {
    let mut commands = vec![
        PathCommand::Move { to: start },
        PathCommand::Line { to: end },
    ];
    let angle = (end.y - start.y).atan2(end.x - start.x);

    if style.has_end() {
        push_head(&mut commands, end, angle, head_length);
    }
    if style.has_start() {
        push_head(&mut commands, start, angle + PI, head_length);
    }
    commands
}

/// Whether a drag between two points is too short to be an arrow.
#[must_use]
pub fn is_degenerate_arrow(start: Point, end: Point) -> bool {
    start.distance(end) < MIN_ARROW_LENGTH
}

/// Recover the logical endpoints from the first two commands.
#[must_use]
pub fn arrow_endpoints(commands: &[PathCommand]) -> Option<(Point, Point)> {
    match commands {
        [PathCommand::Move { to: start }, PathCommand::Line { to: end }, ..] => Some((*start, *end)),
        _ => None,
    }
}

/// Bounding box of every point in the path.
#[must_use]
pub fn path_bounds(commands: &[PathCommand]) -> Bounds {
    let mut points = commands.iter().map(PathCommand::point);
    let Some(first) = points.next() else {
        return Bounds::default();
    };
    let mut bounds = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in points {
        bounds.include(p);
    }
    bounds
}

/// SVG path data, with every point shifted by `(-origin.x, -origin.y)`.
#[must_use]
pub fn to_svg_path(commands: &[PathCommand], origin: Point) -> String {
    let mut d = String::with_capacity(commands.len() * 16);
    for (i, cmd) in commands.iter().enumerate() {
        if i > 0 {
            d.push(' ');
        }
        let p = cmd.point();
        let letter = match cmd {
            PathCommand::Move { .. } => 'M',
            PathCommand::Line { .. } => 'L',
        };
        let _ = write!(d, "{letter}{} {}", p.x - origin.x, p.y - origin.y);
    }
    d
}
