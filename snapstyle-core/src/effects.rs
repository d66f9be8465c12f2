//! Drop shadow and inner glow.
//!
//! Inset shadows are not something the rasterizer can draw, so the inside
//! placement is faked with a wide colored stroke (clipped to the object for
//! images). The same two controls, blur and color, therefore land on
//! different fields depending on placement:
//!
//! | Control | Outside | Inside |
//! |---------|---------|--------|
//! | blur | `shadow.blur` | `stroke_width` |
//! | color | `shadow.color` | `stroke` |
//!
//! The user's real outline is parked in [`SceneObject::original_outline`]
//! while the glow borrows the stroke.

use serde::{Deserialize, Serialize};

use crate::color::{Color, Paint};
use crate::object::{Outline, Shadow};
use crate::{SceneError, SceneObject, SceneResult};

/// Blur used when an effect is created without a previous shadow.
pub const DEFAULT_EFFECT_BLUR: f64 = 20.0;

/// Vertical offset given to a shadow moved back outside.
pub const DEFAULT_SHADOW_OFFSET_Y: f64 = 10.0;

/// Translucent black used for new effects.
#[must_use]
pub fn default_effect_color() -> Color {
    Color::rgba(0, 0, 0, 0.5)
}

/// The shadow added by the shadow toggle.
#[must_use]
pub fn default_shadow() -> Shadow {
    Shadow::new(default_effect_color(), DEFAULT_EFFECT_BLUR)
        .with_offset(0.0, DEFAULT_SHADOW_OFFSET_Y)
}

/// Where the effect is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowPlacement {
    /// Conventional drop shadow.
    #[default]
    Outside,
    /// Inner glow.
    Inside,
}

/// Current effect as the property panel shows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectSettings {
    /// Placement.
    pub placement: ShadowPlacement,
    /// Effect color.
    pub color: Color,
    /// Blur (outside) or glow width (inside).
    pub blur: f64,
    /// Horizontal offset; always 0 inside.
    pub offset_x: f64,
    /// Vertical offset; always 0 inside.
    pub offset_y: f64,
}

fn no_effect() -> SceneError {
    SceneError::InvalidValue("object has no shadow or glow".to_string())
}

impl SceneObject {
    /// Current placement.
    #[must_use]
    pub fn shadow_placement(&self) -> ShadowPlacement {
        if self.inside_shadow {
            ShadowPlacement::Inside
        } else {
            ShadowPlacement::Outside
        }
    }

    /// Whether any shadow or glow is applied.
    #[must_use]
    pub fn has_effect(&self) -> bool {
        self.inside_shadow || self.shadow.is_some()
    }

    /// Current effect, if any.
    #[must_use]
    pub fn effect(&self) -> Option<EffectSettings> {
        if self.inside_shadow {
            return Some(EffectSettings {
                placement: ShadowPlacement::Inside,
                color: self.stroke.color().unwrap_or_else(default_effect_color),
                blur: self.stroke_width,
                offset_x: 0.0,
                offset_y: 0.0,
            });
        }
        self.shadow.map(|s| EffectSettings {
            placement: ShadowPlacement::Outside,
            color: s.color,
            blur: s.blur,
            offset_x: s.offset_x,
            offset_y: s.offset_y,
        })
    }

    /// Move the effect inside or outside.
    pub fn set_shadow_placement(&mut self, placement: ShadowPlacement) {
        if placement == self.shadow_placement() {
            return;
        }
        match placement {
            ShadowPlacement::Inside => {
                if self.original_outline.is_none() {
                    self.original_outline = Some(Outline {
                        stroke: self.stroke,
                        width: self.stroke_width,
                    });
                }
                let (color, blur) = self
                    .shadow
                    .take()
                    .map_or((default_effect_color(), DEFAULT_EFFECT_BLUR), |s| (s.color, s.blur));
                self.stroke = Paint::Solid(color);
                self.stroke_width = blur;
                self.inside_shadow = true;
            }
            ShadowPlacement::Outside => {
                let color = self.stroke.color().unwrap_or_else(default_effect_color);
                let blur = self.stroke_width;
                self.restore_outline();
                self.shadow =
                    Some(Shadow::new(color, blur).with_offset(0.0, DEFAULT_SHADOW_OFFSET_Y));
            }
        }
        self.sync_clip();
        tracing::debug!(id = %self.id, ?placement, "shadow placement changed");
    }

    fn restore_outline(&mut self) {
        let outline = self.original_outline.unwrap_or(Outline {
            stroke: Paint::None,
            width: 0.0,
        });
        self.stroke = outline.stroke;
        self.stroke_width = outline.width;
        self.inside_shadow = false;
    }

    /// Set the blur, routed by placement.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative blur or when there is no effect.
    pub fn set_effect_blur(&mut self, blur: f64) -> SceneResult<()> {
        if !(blur.is_finite() && blur >= 0.0) {
            return Err(SceneError::InvalidValue(format!("blur must be >= 0, got {blur}")));
        }
        if self.inside_shadow {
            self.stroke_width = blur;
        } else {
            self.shadow.as_mut().ok_or_else(no_effect)?.blur = blur;
        }
        Ok(())
    }

    /// Set the color, routed by placement.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no effect.
    pub fn set_effect_color(&mut self, color: Color) -> SceneResult<()> {
        if self.inside_shadow {
            self.stroke = Paint::Solid(color);
        } else {
            self.shadow.as_mut().ok_or_else(no_effect)?.color = color;
        }
        Ok(())
    }

    /// Set the drop shadow offsets.
    ///
    /// # Errors
    ///
    /// Returns an error while the effect is inside or when there is no shadow.
    pub fn set_shadow_offset(&mut self, offset_x: f64, offset_y: f64) -> SceneResult<()> {
        if self.inside_shadow {
            return Err(SceneError::InvalidValue(
                "offsets do not apply to the inside glow".to_string(),
            ));
        }
        let shadow = self.shadow.as_mut().ok_or_else(no_effect)?;
        shadow.offset_x = offset_x;
        shadow.offset_y = offset_y;
        Ok(())
    }

    /// Remove the shadow or glow, restoring the real outline and dropping any
    /// clip that only existed for the glow.
    pub fn remove_effect(&mut self) {
        if self.inside_shadow {
            self.restore_outline();
        }
        self.shadow = None;
        self.sync_clip();
    }

    /// Add the default drop shadow, or remove whatever effect is present.
    ///
    /// Returns whether an effect is applied afterwards.
    pub fn toggle_shadow(&mut self) -> bool {
        if self.has_effect() {
            self.remove_effect();
            false
        } else {
            self.shadow = Some(default_shadow());
            true
        }
    }
}
