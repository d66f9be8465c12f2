//! CSS-style colors and paints.
//!
//! Shapes and text keep their "fill opacity" inside the fill color's alpha
//! channel, so colors round-trip through the same textual forms the editor
//! panels produce: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()` and `rgba()`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// An sRGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `0.0..=1.0`.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with the given alpha (clamped to `0.0..=1.0`).
    #[must_use]
    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: round_alpha(a),
        }
    }

    /// Same color with only the alpha channel replaced.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Whether the color is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// RGBA bytes with the alpha scaled to `0..=255`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, (self.a * 255.0).round() as u8]
    }

    /// Hex form without alpha, e.g. `#3366ff`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn round_alpha(a: f32) -> f32 {
    if a.is_nan() {
        return 1.0;
    }
    (a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_channel(raw: &str, input: &str) -> SceneResult<u8> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| SceneError::InvalidValue(format!("bad color channel in {input:?}")))?;
    Ok(value.clamp(0.0, 255.0).round() as u8)
}

fn parse_hex(hex: &str, input: &str) -> SceneResult<Color> {
    let invalid = || SceneError::InvalidValue(format!("bad hex color {input:?}"));
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let byte = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
    };
    match hex.len() {
        3 => {
            let nibble = |i: usize| byte(i..i + 1).map(|n| n * 17);
            Ok(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => Ok(Color::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
        8 => Ok(Color::rgba(
            byte(0..2)?,
            byte(2..4)?,
            byte(4..6)?,
            f32::from(byte(6..8)?) / 255.0,
        )),
        _ => Err(invalid()),
    }
}

impl FromStr for Color {
    type Err = SceneError;

    fn from_str(input: &str) -> SceneResult<Self> {
        let trimmed = input.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex, input);
        }

        let lower = trimmed.to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| SceneError::InvalidValue(format!("unrecognized color {input:?}")))?;

        let parts: Vec<&str> = body.split(',').collect();
        match parts.as_slice() {
            [r, g, b] => Ok(Self::rgb(
                parse_channel(r, input)?,
                parse_channel(g, input)?,
                parse_channel(b, input)?,
            )),
            [r, g, b, a] => {
                let alpha: f32 = a
                    .trim()
                    .parse()
                    .map_err(|_| SceneError::InvalidValue(format!("bad alpha in {input:?}")))?;
                Ok(Self::rgba(
                    parse_channel(r, input)?,
                    parse_channel(g, input)?,
                    parse_channel(b, input)?,
                    alpha,
                ))
            }
            _ => Err(SceneError::InvalidValue(format!(
                "expected 3 or 4 channels in {input:?}"
            ))),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            f.write_str(&self.to_hex())
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = SceneError;

    fn try_from(value: String) -> SceneResult<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A fill or stroke: either nothing or a solid color.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Paint {
    /// Nothing is painted (`transparent`).
    #[default]
    None,
    /// A solid color.
    Solid(Color),
}

impl Paint {
    /// The solid color, if any.
    #[must_use]
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::None => None,
            Self::Solid(color) => Some(*color),
        }
    }

    /// Whether nothing is painted.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

impl FromStr for Paint {
    type Err = SceneError;

    fn from_str(input: &str) -> SceneResult<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "transparent" => Ok(Self::None),
            _ => input.parse().map(Self::Solid),
        }
    }
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("transparent"),
            Self::Solid(color) => color.fmt(f),
        }
    }
}

impl TryFrom<String> for Paint {
    type Error = SceneError;

    fn try_from(value: String) -> SceneResult<Self> {
        value.parse()
    }
}

impl From<Paint> for String {
    fn from(paint: Paint) -> Self {
        paint.to_string()
    }
}
