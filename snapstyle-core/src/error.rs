//! Error types for scene operations.

use thiserror::Error;

use crate::object::ObjectKindTag;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors that can occur in scene operations.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Object not found in the scene.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// A property edit was requested with nothing selected.
    #[error("No object is selected")]
    NoSelection,

    /// The operation does not apply to this kind of object.
    #[error("{operation} is not supported on {kind} objects")]
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Kind of the object it was attempted on.
        kind: ObjectKindTag,
    },

    /// A value was outside its allowed range.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The stroke is currently driving the inside glow and cannot be edited.
    #[error("Stroke is in use by the inside glow effect")]
    StrokeLocked,

    /// The surface backend failed to produce a raster.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
