//! Error types for the exchange pipeline.

use thiserror::Error;

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Errors that can occur while performing a theme/wallpaper exchange.
///
/// None of these escape the engine's public entry point; [`execute`] maps
/// each of them to a user-facing text outcome.
///
/// [`execute`]: crate::engine::execute
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Theme bytes did not parse.
    #[error("malformed theme: {0}")]
    MalformedTheme(#[from] attheme::ParseError),

    /// Attachment extension is not a recognized raster kind.
    #[error("unsupported image extension: {0}")]
    UnsupportedExtension(String),

    /// Image bytes could not be decoded for re-encoding.
    #[error("image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Transport-level failure retrieving attachment bytes.
    #[error("file fetch failed: {0}")]
    Fetch(String),
}
