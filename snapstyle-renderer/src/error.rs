//! Renderer error types.

use snapstyle_core::SceneError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Composition or encoding failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// The generated SVG could not be parsed.
    #[error("SVG error: {0}")]
    Svg(String),

    /// The scene rejected an operation.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl RenderError {
    /// Flatten into a scene error for the surface backend contract.
    #[must_use]
    pub fn into_scene_error(self) -> SceneError {
        match self {
            Self::Scene(err) => err,
            other => SceneError::Raster(other.to_string()),
        }
    }
}
