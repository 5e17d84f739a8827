//! Image validation, PNG normalization and thumbnailing.
//!
//! Uploads are accepted as PNG or JPEG. They are always decoded and stored
//! re-encoded as PNG so that reads can be served with a single content type.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::ImageError;

/// Default thumbnail bounding box edge in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 40;

/// Content type of every stored image.
pub const STORED_CONTENT_TYPE: &str = "image/png";

/// Map a `Content-Type` header value to a supported image format.
///
/// Parameters such as `; charset=...` are ignored and matching is
/// case-insensitive.
pub fn format_for_content_type(content_type: &str) -> Result<ImageFormat, ImageError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => Ok(ImageFormat::Png),
        "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
        _ => Err(ImageError::UnsupportedContentType(content_type.to_string())),
    }
}

/// Check that `data` is a decodable image of the declared content type.
pub fn validate_image(data: &[u8], content_type: &str) -> Result<ImageFormat, ImageError> {
    let declared = format_for_content_type(content_type)?;

    let detected = image::guess_format(data).map_err(|e| ImageError::Decode(e.to_string()))?;
    if detected != declared {
        return Err(ImageError::FormatMismatch {
            declared: format!("{:?}", declared),
            detected: format!("{:?}", detected),
        });
    }

    decode(data, declared)?;
    Ok(declared)
}

fn decode(data: &[u8], format: ImageFormat) -> Result<DynamicImage, ImageError> {
    ImageReader::with_format(Cursor::new(data), format)
        .decode()
        .map_err(|e| ImageError::Decode(e.to_string()))
}

fn encode_png(image: &DynamicImage) -> Result<Bytes, ImageError> {
    let mut output = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(Bytes::from(output))
}

/// A validated upload, re-encoded and ready to be stored.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub image: Bytes,
    pub thumbnail: Bytes,
}

/// Converts uploads into stored image and thumbnail blobs.
#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    thumbnail_size: u32,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_SIZE)
    }
}

impl ImageCodec {
    pub fn new(thumbnail_size: u32) -> Self {
        Self { thumbnail_size }
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size
    }

    /// Decode an upload and produce the PNG image and its thumbnail.
    ///
    /// The thumbnail keeps the aspect ratio and fits within a
    /// `thumbnail_size` square.
    pub fn prepare(&self, data: &[u8], format: ImageFormat) -> Result<PreparedImage, ImageError> {
        let decoded = decode(data, format)?;
        let thumbnail = decoded.thumbnail(self.thumbnail_size, self.thumbnail_size);

        Ok(PreparedImage {
            image: encode_png(&decoded)?,
            thumbnail: encode_png(&thumbnail)?,
        })
    }
}
