//! Image loading and encoding utilities.
//!
//! Uploads arrive as raw file bytes or base64 data URIs; both decode into a
//! straight-alpha [`RasterImage`]. PNG encoding goes through the `image` crate
//! so the same bytes come out for the same pixels.

use base64::Engine;
use image::ImageEncoder;
use snapstyle_core::RasterImage;
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF, first frame only.
    Gif,
    /// Windows bitmap.
    Bmp,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            "image/gif" => Self::Gif,
            "image/bmp" => Self::Bmp,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        if data.starts_with(b"BM") {
            return Self::Bmp;
        }

        Self::Unknown
    }

    /// MIME type used when writing a data URI.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png | Self::Unknown => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }
}

/// Decode an image file into straight-alpha RGBA pixels.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn load_image_from_bytes(data: &[u8]) -> RenderResult<RasterImage> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RasterImage::new(width, height, rgba.into_raw())?)
}

/// Load an image from a data URI (base64 encoded).
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be decoded.
pub fn load_image_from_data_uri(uri: &str) -> RenderResult<RasterImage> {
    let mime = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .unwrap_or_default();
    if ImageFormat::from_mime(mime) == ImageFormat::Unknown {
        return Err(RenderError::Resource(format!(
            "Unsupported data URI type: {mime:?}"
        )));
    }
    let bytes = data_uri_bytes(uri)?;
    load_image_from_bytes(&bytes)
}

/// Decode one uploaded file: raw image bytes, or the text of a data URI.
///
/// # Errors
///
/// Returns an error if the bytes are neither a decodable image nor a valid
/// image data URI.
pub fn load_upload(bytes: &[u8]) -> RenderResult<RasterImage> {
    if bytes.starts_with(b"data:") {
        let uri = std::str::from_utf8(bytes)
            .map_err(|e| RenderError::Resource(format!("Data URI is not UTF-8: {e}")))?;
        return load_image_from_data_uri(uri);
    }
    load_image_from_bytes(bytes)
}

/// Payload bytes of a base64 data URI.
///
/// # Errors
///
/// Returns an error if the URI is not a base64 data URI.
pub fn data_uri_bytes(uri: &str) -> RenderResult<Vec<u8>> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Err(RenderError::Resource("Not a data URI".to_string()));
    };

    let (metadata, encoded) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    if !metadata.ends_with(";base64") {
        return Err(RenderError::Resource(
            "Only base64 data URIs are supported".to_string(),
        ));
    }

    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
}

/// Decode a batch of uploaded files, skipping any that fail.
///
/// Each file may be raw image bytes or a base64 data URI. Order is preserved among the files that decode.
pub fn decode_uploads<'a>(files: impl IntoIterator<Item = &'a [u8]>) -> Vec<RasterImage> {
    files
        .into_iter()
        .enumerate()
        .filter_map(|(index, bytes)| match load_upload(bytes) {
            Ok(image) => Some(image),
            Err(err) => {
                debug!(index, format = ?ImageFormat::from_magic_bytes(bytes), %err, "skipping upload");
                None
            }
        })
        .collect()
}

/// Encode pixels as PNG.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(image: &RasterImage) -> RenderResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            image.data(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}

/// Base64 data URI for arbitrary image bytes.
#[must_use]
pub fn bytes_to_data_uri(bytes: &[u8]) -> String {
    let mime = ImageFormat::from_magic_bytes(bytes).mime();
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// PNG data URI for the given pixels.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn to_data_uri(image: &RasterImage) -> RenderResult<String> {
    Ok(bytes_to_data_uri(&encode_png(image)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_format_detection_from_mime() {
        assert_eq!(ImageFormat::from_mime("image/png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_mime("IMAGE/JPEG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_mime("image/webp"), ImageFormat::WebP);
        assert_eq!(ImageFormat::from_mime("text/plain"), ImageFormat::Unknown);
    }

    #[test]
    fn test_format_detection_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(ImageFormat::from_magic_bytes(b"no"), ImageFormat::Unknown);
    }

    #[test]
    fn test_data_uri_parsing() {
        let data_uri = format!("data:image/png;base64,{RED_PIXEL_PNG}");
        let image = load_image_from_data_uri(&data_uri).expect("valid data URI");
        assert_eq!((image.width(), image.height()), (1, 1));
        assert_eq!(image.pixel(0, 0).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_data_uri_must_name_an_image_type() {
        let uri = format!("data:text/plain;base64,{RED_PIXEL_PNG}");
        assert!(load_image_from_data_uri(&uri).is_err());
        let uri = format!("data:image/jpg;base64,{RED_PIXEL_PNG}");
        assert!(load_image_from_data_uri(&uri).is_ok());
    }

    #[test]
    fn test_uploads_accept_data_uris() {
        let uri = format!("data:image/png;base64,{RED_PIXEL_PNG}");
        let files: [&[u8]; 3] = [uri.as_bytes(), b"data:image/png;base64,@@@", b"junk"];
        let images = decode_uploads(files);
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width(), images[0].height()), (1, 1));
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(load_image_from_data_uri("not a data uri").is_err());
        assert!(load_image_from_data_uri("data:image/png").is_err());
        assert!(load_image_from_data_uri("data:image/png,rawbytes").is_err());
    }

    #[test]
    fn test_encode_png_has_signature_and_decodes() {
        let image = RasterImage::new(2, 1, vec![10, 20, 30, 255, 0, 0, 0, 0]).expect("raster");
        let png = encode_png(&image).expect("encode");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);

        let back = load_image_from_bytes(&png).expect("decode");
        assert_eq!(back.data(), image.data());
    }

    #[test]
    fn test_decode_uploads_skips_failures() {
        let png = encode_png(&RasterImage::transparent(3, 2)).expect("encode");
        let files: [&[u8]; 3] = [b"garbage", png.as_slice(), b""];
        let decoded = decode_uploads(files);
        assert_eq!(decoded.len(), 1);
        assert_eq!((decoded[0].width(), decoded[0].height()), (3, 2));
    }

    #[test]
    fn test_data_uri_uses_png_mime() {
        let uri = to_data_uri(&RasterImage::transparent(1, 1)).expect("uri");
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(load_image_from_data_uri(&uri).is_ok());
    }
}
