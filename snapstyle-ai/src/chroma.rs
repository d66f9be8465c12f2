//! Chroma-key removal of a flat generated background.
//!
//! The key color is sampled from the top-left pixel rather than assumed to be
//! [`KEY_COLOR`], since providers rarely paint it exactly. Pixels close to it
//! become transparent, a band around that is feathered linearly, and the rest
//! is left alone.

use image::RgbaImage;
use snapstyle_core::RasterImage;
use tracing::{debug, warn};

use crate::error::{AiError, AiResult};
use crate::prompt::KEY_COLOR;

/// Distance below which a pixel is fully keyed out.
pub const HARD_THRESHOLD: f64 = 35.0;

/// Distance above which a pixel is untouched.
pub const SOFT_THRESHOLD: f64 = 75.0;

fn distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Remove the background matching the top-left pixel.
///
/// # Errors
///
/// Returns an error for an empty image or inconsistent pixel data.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn chroma_key(image: &RasterImage) -> AiResult<RasterImage> {
    let mut rgba = RgbaImage::from_raw(image.width(), image.height(), image.data().to_vec())
        .ok_or_else(|| AiError::Decode("pixel buffer does not match size".to_string()))?;
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(AiError::Decode("empty image".to_string()));
    }

    let k = rgba.get_pixel(0, 0).0;
    let key = [k[0], k[1], k[2]];
    if distance(key, KEY_COLOR) >= SOFT_THRESHOLD {
        debug!(?key, requested = ?KEY_COLOR, "background is not the requested key color");
    }
    let mut keyed = 0usize;
    for pixel in rgba.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let d = distance([r, g, b], key);
        if d < HARD_THRESHOLD {
            pixel.0[3] = 0;
            keyed += 1;
        } else if d < SOFT_THRESHOLD {
            let t = (d - HARD_THRESHOLD) / (SOFT_THRESHOLD - HARD_THRESHOLD);
            pixel.0[3] = (f64::from(a) * t).round() as u8;
        }
    }
    debug!(?key, keyed, "chroma key applied");

    let (width, height) = rgba.dimensions();
    Ok(RasterImage::new(width, height, rgba.into_raw())?)
}

/// Key out the background, or hand back the image untouched if that fails.
#[must_use]
pub fn key_out_background(image: RasterImage) -> RasterImage {
    match chroma_key(&image) {
        Ok(keyed) => keyed,
        Err(err) => {
            warn!(%err, "chroma key failed, using unprocessed image");
            image
        }
    }
}
