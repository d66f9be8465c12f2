//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::{SceneError, SceneResult};

/// Configuration for an [`crate::EditorSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Surface width before any image is uploaded.
    pub default_width: u32,
    /// Surface height before any image is uploaded.
    pub default_height: u32,
    /// Largest content width the first upload may set.
    pub max_content_width: u32,
    /// Largest content height the first upload may set.
    pub max_content_height: u32,
    /// Offset between successive secondary uploads.
    pub cascade_offset: f64,
    /// Fraction of the fit scale used for secondary uploads.
    pub secondary_scale: f64,
    /// Resolution multiplier for export.
    pub export_multiplier: f64,
    /// File name offered for the exported PNG.
    pub export_filename: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_width: 800,
            default_height: 600,
            max_content_width: 1000,
            max_content_height: 800,
            cascade_offset: 20.0,
            secondary_scale: 0.6,
            export_multiplier: 4.0,
            export_filename: "snapstyle-export.png".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or out-of-range values.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first bad value.
    pub fn validate(&self) -> SceneResult<()> {
        if self.default_width == 0
            || self.default_height == 0
            || self.max_content_width == 0
            || self.max_content_height == 0
        {
            return Err(SceneError::InvalidValue("sizes must be positive".to_string()));
        }
        if !(self.export_multiplier.is_finite() && self.export_multiplier > 0.0) {
            return Err(SceneError::InvalidValue(format!(
                "export_multiplier must be positive, got {}",
                self.export_multiplier
            )));
        }
        if !(self.secondary_scale > 0.0 && self.secondary_scale <= 1.0) {
            return Err(SceneError::InvalidValue(format!(
                "secondary_scale must be within (0, 1], got {}",
                self.secondary_scale
            )));
        }
        if self.export_filename.trim().is_empty() {
            return Err(SceneError::InvalidValue("export_filename is empty".to_string()));
        }
        Ok(())
    }
}
