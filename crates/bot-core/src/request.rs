//! Per-message request classification.
//!
//! The transport builds one [`ExchangeRequest`] per incoming message; the
//! decision engine consumes it exactly once. Keeping the classification a
//! closed set of variants lets the decision table be a pure, exhaustively
//! matched function.

/// Opaque platform file identifier, resolvable to bytes by a
/// [`FileFetcher`](crate::engine::FileFetcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef(pub String);

impl FileRef {
    pub fn new(id: impl Into<String>) -> Self {
        FileRef(id.into())
    }
}

/// The attachment carried by the current message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// A document with a declared file name.
    Document { file: FileRef, file_name: String },
    /// A photo; the transport picks the largest available resolution.
    Photo { file: FileRef },
}

/// What the reply target carried, when the current message is a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyAttachment {
    /// The replied-to message holds a named document.
    Document { file: FileRef, file_name: String },
    /// The replied-to message holds no document attachment.
    Other,
}

/// A classified incoming message: the current attachment plus the reply
/// target's attachment, if the message is a reply at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub attachment: Attachment,
    pub reply: Option<ReplyAttachment>,
}

const THEME_EXTENSION: &str = ".attheme";

/// True iff the file name declares a theme file.
pub fn is_theme_file(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(THEME_EXTENSION)
}

/// Theme name without the `.attheme` suffix.
///
/// Callers check [`is_theme_file`] first; a name without the suffix is
/// returned unchanged.
pub fn theme_base_name(file_name: &str) -> &str {
    if is_theme_file(file_name) {
        &file_name[..file_name.len() - THEME_EXTENSION.len()]
    } else {
        file_name
    }
}

/// Extension after the final dot, if any.
pub fn file_extension(file_name: &str) -> Option<&str> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        None
    } else {
        Some(extension)
    }
}
