//! Normalization of input images into the JPEG bytes themes store.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::{ExchangeError, ExchangeResult};

/// Classification of a supported input image extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Already JPEG; stored as-is to avoid lossy double compression.
    Jpeg,
    /// A raster format that needs a decode/re-encode pass (PNG, BMP).
    Raster,
}

impl ImageKind {
    /// Classifies a file extension, case-insensitively. Returns `None` for
    /// anything that is not a recognized raster kind.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" | "bmp" => Some(ImageKind::Raster),
            _ => None,
        }
    }
}

/// JPEG-encoded image bytes, whatever the source encoding was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage(Vec<u8>);

impl NormalizedImage {
    /// Wraps bytes that are already JPEG (the photo-attachment path, where
    /// the platform has transcoded for us).
    pub fn from_jpeg(bytes: Vec<u8>) -> Self {
        NormalizedImage(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Converts input bytes of the given kind into JPEG bytes.
///
/// JPEG input passes through unchanged; other raster input is fully decoded
/// in memory and re-encoded. Decode failures propagate as
/// [`ExchangeError::ImageDecode`].
pub fn normalize(kind: ImageKind, bytes: Vec<u8>) -> ExchangeResult<NormalizedImage> {
    match kind {
        ImageKind::Jpeg => Ok(NormalizedImage(bytes)),
        ImageKind::Raster => {
            let decoded = image::load_from_memory(&bytes)?;
            let mut encoded = Cursor::new(Vec::new());
            decoded.write_to(&mut encoded, ImageFormat::Jpeg)?;
            Ok(NormalizedImage(encoded.into_inner()))
        }
    }
}

/// Convenience wrapper that classifies the extension first.
pub fn normalize_extension(
    extension: &str,
    bytes: Vec<u8>,
) -> ExchangeResult<NormalizedImage> {
    let kind = ImageKind::from_extension(extension)
        .ok_or_else(|| ExchangeError::UnsupportedExtension(extension.to_string()))?;
    normalize(kind, bytes)
}
