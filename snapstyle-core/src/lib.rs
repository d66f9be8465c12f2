//! # SnapStyle Core
//!
//! Scene model and interactive editing engine for the SnapStyle screenshot
//! beautifier.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               EditorSession                 │
//! ├─────────────────────────────────────────────┤
//! │  Drawing tools    │  Property editor        │
//! │  - Rect / circle  │  - Transform, opacity   │
//! │  - Arrow builder  │  - Outline, text, glow  │
//! ├─────────────────────────────────────────────┤
//! │  Surface          │  Frame style            │
//! │  - Ordered scene  │  - Gradient / solid     │
//! │  - Backend trait  │  - Padding, rounding    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Pixels are produced by whatever [`SurfaceBackend`] the host plugs in; the
//! `snapstyle-renderer` crate provides the real one.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod config;
pub mod effects;
pub mod error;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod layers;
pub mod object;
pub mod properties;
pub mod raster;
pub mod scene;
pub mod session;
pub mod surface;
pub mod tool;

pub use color::{Color, Paint};
pub use config::EditorConfig;
pub use effects::{EffectSettings, ShadowPlacement};
pub use error::{SceneError, SceneResult};
pub use event::{PointerEvent, PointerPhase, SceneEvent};
pub use frame::{Background, FrameStyle, LinearGradient, Template, GRADIENT_PRESETS};
pub use geometry::{ArrowStyle, Bounds, PathCommand, Point};
pub use layers::LayerEntry;
pub use object::{
    ClipRect, FontWeight, ObjectId, ObjectKind, ObjectKindTag, Outline, SceneObject, Shadow,
    TextAlign, TextStyle, FONT_FAMILIES,
};
pub use raster::RasterImage;
pub use scene::Scene;
pub use session::EditorSession;
pub use surface::{HeadlessBackend, Surface, SurfaceBackend};
pub use tool::{DrawOutcome, DrawingTool, ShapeStyle, ToolKind, ToolState};

/// SnapStyle core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
