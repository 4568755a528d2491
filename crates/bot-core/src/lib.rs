//! Platform-agnostic engine for exchanging wallpapers with `.attheme` files.
//!
//! This crate provides:
//! - Error taxonomy for the exchange pipeline
//! - Image normalization into the JPEG representation themes store
//! - Per-message request classification
//! - The decision engine mapping a classified request to exactly one outcome
//!
//! Platform adapters (the Telegram binary) build on these primitives and own
//! all transport concerns.

pub mod engine;
pub mod error;
pub mod image;
pub mod request;

pub use engine::{
    Action, Caption, FileFetcher, ImageSource, Notice, Outcome, Plan, Reply,
    execute, plan, wallpaper_file_name,
};
pub use error::{ExchangeError, ExchangeResult};
pub use self::image::{ImageKind, NormalizedImage, normalize, normalize_extension};
pub use request::{
    Attachment, ExchangeRequest, FileRef, ReplyAttachment, file_extension,
    is_theme_file, theme_base_name,
};
