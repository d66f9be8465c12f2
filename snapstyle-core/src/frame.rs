//! Frame style: the background, padding and rounding around the content.

use serde::{Deserialize, Serialize};

use crate::color::{Color, Paint};
use crate::object::Shadow;
use crate::{SceneError, SceneResult};

/// Gradients offered by the background picker.
pub const GRADIENT_PRESETS: &[&str] = &[
    "linear-gradient(135deg, #6366f1 0%, #a855f7 100%)",
    "linear-gradient(135deg, #0ea5e9 0%, #2563eb 100%)",
    "linear-gradient(135deg, #10b981 0%, #3b82f6 100%)",
    "linear-gradient(135deg, #f43f5e 0%, #fb923c 100%)",
    "linear-gradient(135deg, #1e293b 0%, #0f172a 100%)",
    "linear-gradient(135deg, #8b5cf6 0%, #ec4899 100%)",
];

/// A two-stop linear gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    /// CSS angle in degrees: 0 points up, 90 points right.
    pub angle_deg: f64,
    /// Color at 0%.
    pub from: Color,
    /// Color at 100%.
    pub to: Color,
}

impl LinearGradient {
    /// Parse `linear-gradient(<deg>deg, <hex> 0%, <hex> 100%)`.
    ///
    /// Any other form, including named colors, extra stops or other stop
    /// positions, yields `None`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let body = input
            .trim()
            .strip_prefix("linear-gradient(")?
            .strip_suffix(')')?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let [angle, first, second] = parts.as_slice() else {
            return None;
        };
        let angle_deg: f64 = angle.strip_suffix("deg")?.trim().parse().ok()?;
        if !angle_deg.is_finite() {
            return None;
        }
        Some(Self {
            angle_deg,
            from: parse_stop(first, "0%")?,
            to: parse_stop(second, "100%")?,
        })
    }
}

fn parse_stop(stop: &str, position: &str) -> Option<Color> {
    let mut tokens = stop.split_whitespace();
    let hex = tokens.next()?;
    if tokens.next()? != position || tokens.next().is_some() || !hex.starts_with('#') {
        return None;
    }
    hex.parse().ok()
}

/// How the frame background is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    /// No background at all.
    Transparent,
    /// A flat color.
    Solid(Color),
    /// A two-stop gradient.
    Gradient(LinearGradient),
}

/// Scene-level frame settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStyle {
    /// Background color; `transparent` disables the background entirely.
    pub background_color: Paint,
    /// Gradient CSS, or empty for a solid background.
    pub background_gradient: String,
    /// Space around the content, in logical pixels.
    pub padding: f64,
    /// Corner radius of the background.
    pub border_radius: f64,
    /// Blur of the shadow given to uploaded images.
    pub shadow_blur: f64,
    /// Opacity of the shadow given to uploaded images.
    pub shadow_opacity: f64,
    /// Overrides the natural content width.
    pub custom_width: Option<u32>,
    /// Overrides the natural content height.
    pub custom_height: Option<u32>,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            background_color: Paint::Solid(Color::rgb(0x63, 0x66, 0xf1)),
            background_gradient: GRADIENT_PRESETS[0].to_string(),
            padding: 60.0,
            border_radius: 16.0,
            shadow_blur: 30.0,
            shadow_opacity: 0.3,
            custom_width: None,
            custom_height: None,
        }
    }
}

impl FrameStyle {
    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> SceneResult<()> {
        let non_negative = [
            ("padding", self.padding),
            ("border_radius", self.border_radius),
            ("shadow_blur", self.shadow_blur),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SceneError::InvalidValue(format!("{name} must be >= 0, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.shadow_opacity) {
            return Err(SceneError::InvalidValue(format!(
                "shadow_opacity must be within 0..=1, got {}",
                self.shadow_opacity
            )));
        }
        if self.custom_width == Some(0) || self.custom_height == Some(0) {
            return Err(SceneError::InvalidValue("custom size must be positive".to_string()));
        }
        Ok(())
    }

    /// Resolve what the exporter paints behind the content.
    #[must_use]
    pub fn background(&self) -> Background {
        let Some(color) = self.background_color.color() else {
            return Background::Transparent;
        };
        if self.background_gradient.trim().is_empty() {
            return Background::Solid(color);
        }
        match LinearGradient::parse(&self.background_gradient) {
            Some(gradient) => Background::Gradient(gradient),
            None => {
                tracing::warn!(
                    gradient = %self.background_gradient,
                    "unsupported gradient, using solid background"
                );
                Background::Solid(color)
            }
        }
    }

    /// Pick a solid color, clearing the gradient.
    pub fn set_solid(&mut self, color: Paint) {
        self.background_color = color;
        self.background_gradient.clear();
    }

    /// Content size after custom overrides.
    #[must_use]
    pub fn content_size(&self, natural_width: u32, natural_height: u32) -> (u32, u32) {
        (
            self.custom_width.unwrap_or(natural_width),
            self.custom_height.unwrap_or(natural_height),
        )
    }

    /// Drop shadow given to newly uploaded images.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn image_shadow(&self) -> Shadow {
        Shadow::new(
            Color::rgba(0, 0, 0, self.shadow_opacity as f32),
            self.shadow_blur,
        )
        .with_offset(0.0, 10.0)
    }

    /// Defaults overlaid with a template's settings.
    #[must_use]
    pub fn from_template(template: &Template) -> Self {
        let mut style = Self::default();
        let overlay = &template.config;
        if let Some(color) = overlay.background_color {
            style.background_color = color;
        }
        if let Some(gradient) = &overlay.background_gradient {
            style.background_gradient.clone_from(gradient);
        }
        if let Some(padding) = overlay.padding {
            style.padding = padding;
        }
        if let Some(radius) = overlay.border_radius {
            style.border_radius = radius;
        }
        style
    }
}

/// Partial frame settings carried by a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Background color.
    pub background_color: Option<Paint>,
    /// Gradient CSS; `Some("")` clears the gradient.
    pub background_gradient: Option<String>,
    /// Padding.
    pub padding: Option<f64>,
    /// Corner radius.
    pub border_radius: Option<f64>,
}

/// A named frame preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Settings applied over the defaults.
    pub config: TemplateConfig,
}

fn gradient_template(id: &str, name: &str, gradient: &str, padding: f64, radius: f64) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        config: TemplateConfig {
            background_color: None,
            background_gradient: Some(gradient.to_string()),
            padding: Some(padding),
            border_radius: Some(radius),
        },
    }
}

/// The built-in templates.
#[must_use]
pub fn templates() -> Vec<Template> {
    vec![
        gradient_template("t1", "Modern Ocean", GRADIENT_PRESETS[1], 60.0, 20.0),
        gradient_template("t2", "Sunset Glow", GRADIENT_PRESETS[3], 80.0, 12.0),
        gradient_template("t3", "Deep Space", GRADIENT_PRESETS[4], 40.0, 8.0),
        Template {
            id: "t4".to_string(),
            name: "Minimalist White".to_string(),
            config: TemplateConfig {
                background_color: Some(Paint::Solid(Color::rgb(0xf8, 0xfa, 0xfc))),
                background_gradient: Some(String::new()),
                padding: Some(100.0),
                border_radius: Some(4.0),
            },
        },
    ]
}

/// Largest size within `max` that keeps the aspect ratio of `natural`,
/// never upscaling.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn fit_within(natural: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (w, h) = (f64::from(natural.0), f64::from(natural.1));
    if w <= 0.0 || h <= 0.0 {
        return natural;
    }
    let scale = (f64::from(max.0) / w).min(f64::from(max.1) / h).min(1.0);
    (
        ((w * scale).round() as u32).max(1),
        ((h * scale).round() as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_stop_gradient() {
        let g = LinearGradient::parse("linear-gradient(135deg, #6366f1 0%, #a855f7 100%)")
            .expect("gradient");
        assert_eq!(g.angle_deg, 135.0);
        assert_eq!(g.from, Color::rgb(0x63, 0x66, 0xf1));
        assert_eq!(g.to, Color::rgb(0xa8, 0x55, 0xf7));
    }

    #[test]
    fn test_other_gradient_forms_rejected() {
        for css in [
            "radial-gradient(circle, #000 0%, #fff 100%)",
            "linear-gradient(to right, #000 0%, #fff 100%)",
            "linear-gradient(90deg, #000 0%, #888 50%, #fff 100%)",
            "linear-gradient(90deg, red 0%, blue 100%)",
            "linear-gradient(90deg, #000 10%, #fff 100%)",
        ] {
            assert!(LinearGradient::parse(css).is_none(), "{css} should not parse");
        }
    }

    #[test]
    fn test_background_resolution() {
        let mut style = FrameStyle::default();
        assert!(matches!(style.background(), Background::Gradient(_)));

        style.background_gradient = "conic-gradient(red, blue)".to_string();
        assert_eq!(style.background(), Background::Solid(Color::rgb(0x63, 0x66, 0xf1)));

        style.set_solid(Paint::None);
        assert_eq!(style.background(), Background::Transparent);
    }

    #[test]
    fn test_templates_overlay_defaults() {
        let all = templates();
        assert_eq!(all.len(), 4);
        let white = FrameStyle::from_template(&all[3]);
        assert_eq!(white.background(), Background::Solid(Color::rgb(0xf8, 0xfa, 0xfc)));
        assert_eq!(white.padding, 100.0);
        assert_eq!(white.shadow_blur, 30.0);

        let ocean = FrameStyle::from_template(&all[0]);
        assert_eq!(ocean.border_radius, 20.0);
        assert_eq!(ocean.background_gradient, GRADIENT_PRESETS[1]);
    }

    #[test]
    fn test_fit_within_caps_and_keeps_aspect() {
        assert_eq!(fit_within((2000, 1000), (1000, 800)), (1000, 500));
        assert_eq!(fit_within((600, 1600), (1000, 800)), (300, 800));
        assert_eq!(fit_within((640, 480), (1000, 800)), (640, 480));
    }

    #[test]
    fn test_validate_rejects_negative_padding() {
        let style = FrameStyle {
            padding: -1.0,
            ..FrameStyle::default()
        };
        assert!(style.validate().is_err());
        assert!(FrameStyle::default().validate().is_ok());
    }
}
