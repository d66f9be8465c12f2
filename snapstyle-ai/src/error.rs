//! Errors for the generative background adapter.

use snapstyle_core::SceneError;
use snapstyle_renderer::RenderError;
use thiserror::Error;

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Errors that can occur while generating or editing a background.
#[derive(Debug, Error)]
pub enum AiError {
    /// Another request is still in flight.
    #[error("an AI request is already in progress")]
    Busy,

    /// The provider rejected the credentials.
    #[error("image provider denied access (HTTP {status})")]
    PermissionDenied {
        /// HTTP status code, 401 or 403.
        status: u16,
    },

    /// HTTP layer failed (connection, timeout, etc.).
    #[error("image provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed unexpectedly.
    #[error("failed to parse image provider payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered with an error status.
    #[error("image provider error {status}: {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response carried no image data.
    #[error("the provider returned no image")]
    NoImageGenerated,

    /// The returned image could not be decoded.
    #[error("could not decode generated image: {0}")]
    Decode(String),

    /// Endpoint, key or model setting is unusable.
    #[error("invalid AI configuration: {0}")]
    InvalidConfig(String),

    /// The scene rejected the result.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Encoding the source image failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AiError {
    /// Text for the blocking alert shown to the user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Busy => "A background is already being generated. Please wait.",
            Self::PermissionDenied { .. } => {
                "Access to the image service was denied. Please sign in again and retry."
            }
            Self::NoImageGenerated => "No image was generated. Try a different image or try again.",
            _ => "Failed to generate the background. Please try again.",
        }
    }

    /// Whether the host should offer to re-authenticate.
    #[must_use]
    pub fn needs_reauthentication(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
