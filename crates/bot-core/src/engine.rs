//! The exchange decision engine.
//!
//! Each invocation is stateless: [`plan`] maps a classified request to a
//! [`Plan`] through the decision table, and [`execute`] drives the fetcher,
//! codec and normalizer to turn that plan into exactly one [`Outcome`].
//! Every lower-level error is caught here and becomes a text notice; nothing
//! escapes the engine.

use async_trait::async_trait;
use attheme::Attheme;
use tracing::{debug, warn};

use crate::error::{ExchangeError, ExchangeResult};
use crate::image::{ImageKind, NormalizedImage, normalize};
use crate::request::{
    Attachment, ExchangeRequest, FileRef, ReplyAttachment, file_extension,
    is_theme_file, theme_base_name,
};

/// Resolves a platform file identifier to its raw bytes.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch(&self, file: &FileRef) -> ExchangeResult<Vec<u8>>;
}

/// User-facing text outcomes. The transport owns the actual wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The theme carries no wallpaper to extract.
    ThemeHasNoWallpaper,
    /// The reply target is not a theme document.
    NoThemeInReply,
    /// The attachment extension is not a recognized image kind.
    UnknownFileExtension,
    /// An image arrived with no theme to attach it to.
    ImageWithNoReply,
    /// The theme bytes did not parse.
    MalformedTheme,
    /// Fetch or decode failed mid-exchange.
    ProcessingFailed,
}

/// Which caption the transport should render on an outgoing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caption {
    /// "Here's the wallpaper" on an extracted image.
    Wallpaper,
    /// "Added the wallpaper" on a mutated theme.
    Theme,
}

/// The reply half of an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Document {
        file_name: String,
        bytes: Vec<u8>,
        caption: Caption,
    },
    Text(Notice),
}

/// Exactly one outcome per handled message. `warning` precedes the reply
/// when the request shape warranted a heads-up but processing continued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub warning: Option<Notice>,
    pub reply: Reply,
}

/// Where the bytes for an injection come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A document attachment, normalized by extension.
    Document { file: FileRef, kind: ImageKind },
    /// A photo attachment; the platform already transcoded it to a
    /// displayable raster, so the bytes are stored directly.
    Photo { file: FileRef },
}

/// What the engine decided to do for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Pull the wallpaper out of the current theme document.
    Extract { theme: FileRef, theme_name: String },
    /// Put the current image into the reply target's theme.
    Inject {
        theme: FileRef,
        theme_file_name: String,
        source: ImageSource,
    },
    /// Text-only reply, no document work.
    Notify(Notice),
}

/// A planned exchange: an optional warning plus the action to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub warning: Option<Notice>,
    pub action: Action,
}

/// The decision table, first match wins. Pure: no I/O, fully testable.
pub fn plan(request: ExchangeRequest) -> Plan {
    match request.attachment {
        Attachment::Document { file, file_name } => match request.reply {
            Some(ReplyAttachment::Document {
                file: theme,
                file_name: theme_file_name,
            }) if is_theme_file(&theme_file_name) => {
                match file_extension(&file_name).and_then(ImageKind::from_extension) {
                    Some(kind) => Plan {
                        warning: None,
                        action: Action::Inject {
                            theme,
                            theme_file_name,
                            source: ImageSource::Document { file, kind },
                        },
                    },
                    None => Plan {
                        warning: None,
                        action: Action::Notify(Notice::UnknownFileExtension),
                    },
                }
            }
            // Reply present but not a theme: warn, then evaluate the current
            // document on its own merits, as if it had no reply.
            Some(_) => Plan {
                warning: Some(Notice::NoThemeInReply),
                action: standalone_document_action(file, file_name),
            },
            None => Plan {
                warning: None,
                action: standalone_document_action(file, file_name),
            },
        },
        Attachment::Photo { file } => match request.reply {
            Some(ReplyAttachment::Document {
                file: theme,
                file_name: theme_file_name,
            }) if is_theme_file(&theme_file_name) => Plan {
                warning: None,
                action: Action::Inject {
                    theme,
                    theme_file_name,
                    source: ImageSource::Photo { file },
                },
            },
            _ => Plan {
                warning: None,
                action: Action::Notify(Notice::ImageWithNoReply),
            },
        },
    }
}

/// No-reply rules for a lone document: themes are extracted, anything else
/// is a stray image with nothing to attach to.
fn standalone_document_action(file: FileRef, file_name: String) -> Action {
    if is_theme_file(&file_name) {
        let theme_name = theme_base_name(&file_name).to_string();
        Action::Extract { theme: file, theme_name }
    } else {
        Action::Notify(Notice::ImageWithNoReply)
    }
}

/// Runs a plan to completion. Never fails: errors become text notices.
pub async fn execute<F: FileFetcher>(fetcher: &F, plan: Plan) -> Outcome {
    let Plan { warning, action } = plan;
    let reply = match run_action(fetcher, action).await {
        Ok(reply) => reply,
        Err(error) => {
            warn!(%error, "exchange failed");
            Reply::Text(notice_for(&error))
        }
    };
    Outcome { warning, reply }
}

async fn run_action<F: FileFetcher>(
    fetcher: &F,
    action: Action,
) -> ExchangeResult<Reply> {
    match action {
        Action::Notify(notice) => Ok(Reply::Text(notice)),
        Action::Extract { theme, theme_name } => {
            let bytes = fetcher.fetch(&theme).await?;
            let theme = Attheme::from_bytes(&bytes)?;

            match theme.wallpaper {
                Some(wallpaper) => {
                    debug!(%theme_name, "extracted wallpaper");
                    Ok(Reply::Document {
                        file_name: wallpaper_file_name(&theme_name),
                        bytes: wallpaper,
                        caption: Caption::Wallpaper,
                    })
                }
                None => Ok(Reply::Text(Notice::ThemeHasNoWallpaper)),
            }
        }
        Action::Inject { theme, theme_file_name, source } => {
            let (image, theme_bytes) =
                tokio::try_join!(fetch_image(fetcher, &source), fetcher.fetch(&theme))?;

            let mut theme = Attheme::from_bytes(&theme_bytes)?;
            theme.set_wallpaper(image.into_bytes());

            debug!(%theme_file_name, "injected wallpaper");
            Ok(Reply::Document {
                file_name: theme_file_name,
                bytes: theme.to_bytes(),
                caption: Caption::Theme,
            })
        }
    }
}

async fn fetch_image<F: FileFetcher>(
    fetcher: &F,
    source: &ImageSource,
) -> ExchangeResult<NormalizedImage> {
    match source {
        ImageSource::Document { file, kind } => {
            let bytes = fetcher.fetch(file).await?;
            normalize(*kind, bytes)
        }
        ImageSource::Photo { file } => {
            let bytes = fetcher.fetch(file).await?;
            Ok(NormalizedImage::from_jpeg(bytes))
        }
    }
}

/// File name for an extracted wallpaper document.
pub fn wallpaper_file_name(theme_name: &str) -> String {
    format!("Wallpaper of {theme_name}.jpg")
}

fn notice_for(error: &ExchangeError) -> Notice {
    match error {
        ExchangeError::MalformedTheme(_) => Notice::MalformedTheme,
        ExchangeError::UnsupportedExtension(_) => Notice::UnknownFileExtension,
        ExchangeError::ImageDecode(_) | ExchangeError::Fetch(_) => {
            Notice::ProcessingFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;

    use super::*;

    fn document(id: &str, name: &str) -> Attachment {
        Attachment::Document {
            file: FileRef::new(id),
            file_name: name.to_string(),
        }
    }

    fn reply_document(id: &str, name: &str) -> ReplyAttachment {
        ReplyAttachment::Document {
            file: FileRef::new(id),
            file_name: name.to_string(),
        }
    }

    struct MapFetcher(HashMap<String, Vec<u8>>);

    impl MapFetcher {
        fn new(entries: &[(&str, &[u8])]) -> Self {
            MapFetcher(
                entries
                    .iter()
                    .map(|(id, bytes)| (id.to_string(), bytes.to_vec()))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl FileFetcher for MapFetcher {
        async fn fetch(&self, file: &FileRef) -> ExchangeResult<Vec<u8>> {
            self.0
                .get(&file.0)
                .cloned()
                .ok_or_else(|| ExchangeError::Fetch(format!("no such file {}", file.0)))
        }
    }

    fn png_fixture() -> Vec<u8> {
        let pixels = image::RgbImage::from_pixel(3, 3, image::Rgb([10, 120, 200]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(pixels)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    // Decision table

    #[test]
    fn lone_theme_document_plans_extraction() {
        let request = ExchangeRequest {
            attachment: document("t1", "Day.attheme"),
            reply: None,
        };
        let plan = plan(request);
        assert_eq!(plan.warning, None);
        assert_eq!(
            plan.action,
            Action::Extract {
                theme: FileRef::new("t1"),
                theme_name: "Day".to_string(),
            }
        );
    }

    #[test]
    fn image_document_replying_to_theme_plans_injection() {
        let request = ExchangeRequest {
            attachment: document("i1", "wall.PNG"),
            reply: Some(reply_document("t1", "Day.attheme")),
        };
        let plan = plan(request);
        assert_eq!(plan.warning, None);
        assert_eq!(
            plan.action,
            Action::Inject {
                theme: FileRef::new("t1"),
                theme_file_name: "Day.attheme".to_string(),
                source: ImageSource::Document {
                    file: FileRef::new("i1"),
                    kind: ImageKind::Raster,
                },
            }
        );
    }

    #[test]
    fn unknown_extension_with_theme_reply_is_text_only() {
        let request = ExchangeRequest {
            attachment: document("i1", "wall.gif"),
            reply: Some(reply_document("t1", "Day.attheme")),
        };
        let plan = plan(request);
        assert_eq!(plan.warning, None);
        assert_eq!(plan.action, Action::Notify(Notice::UnknownFileExtension));
    }

    #[test]
    fn lone_image_document_gets_no_reply_notice() {
        let request = ExchangeRequest {
            attachment: document("i1", "wall.png"),
            reply: None,
        };
        assert_eq!(
            plan(request).action,
            Action::Notify(Notice::ImageWithNoReply)
        );
    }

    // The warn-then-continue edge case: a reply to a non-theme message warns
    // but still evaluates the current document under the no-reply rules.
    #[test]
    fn non_theme_reply_warns_then_extracts_current_theme() {
        let request = ExchangeRequest {
            attachment: document("t1", "Day.attheme"),
            reply: Some(ReplyAttachment::Other),
        };
        let plan = plan(request);
        assert_eq!(plan.warning, Some(Notice::NoThemeInReply));
        assert_eq!(
            plan.action,
            Action::Extract {
                theme: FileRef::new("t1"),
                theme_name: "Day".to_string(),
            }
        );
    }

    #[test]
    fn non_theme_reply_warns_then_notices_stray_image() {
        let request = ExchangeRequest {
            attachment: document("i1", "wall.png"),
            reply: Some(reply_document("x1", "notes.txt")),
        };
        let plan = plan(request);
        assert_eq!(plan.warning, Some(Notice::NoThemeInReply));
        assert_eq!(plan.action, Action::Notify(Notice::ImageWithNoReply));
    }

    #[test]
    fn photo_replying_to_theme_plans_photo_injection() {
        let request = ExchangeRequest {
            attachment: Attachment::Photo { file: FileRef::new("p1") },
            reply: Some(reply_document("t1", "Day.attheme")),
        };
        assert_eq!(
            plan(request).action,
            Action::Inject {
                theme: FileRef::new("t1"),
                theme_file_name: "Day.attheme".to_string(),
                source: ImageSource::Photo { file: FileRef::new("p1") },
            }
        );
    }

    #[test]
    fn photo_without_theme_reply_gets_no_reply_notice() {
        let lone = ExchangeRequest {
            attachment: Attachment::Photo { file: FileRef::new("p1") },
            reply: None,
        };
        assert_eq!(plan(lone).action, Action::Notify(Notice::ImageWithNoReply));

        let wrong_reply = ExchangeRequest {
            attachment: Attachment::Photo { file: FileRef::new("p1") },
            reply: Some(reply_document("x1", "notes.txt")),
        };
        assert_eq!(
            plan(wrong_reply).action,
            Action::Notify(Notice::ImageWithNoReply)
        );
    }

    // Execution

    #[tokio::test]
    async fn extraction_returns_wallpaper_document() {
        let raw = b"a=#1\nWPS\n\xff\xd8jpeg-bytes\nWPE\n";
        let fetcher = MapFetcher::new(&[("t1", raw)]);
        let request = ExchangeRequest {
            attachment: document("t1", "sample.attheme"),
            reply: None,
        };

        let outcome = execute(&fetcher, plan(request)).await;

        assert_eq!(outcome.warning, None);
        assert_eq!(
            outcome.reply,
            Reply::Document {
                file_name: "Wallpaper of sample.jpg".to_string(),
                bytes: b"\xff\xd8jpeg-bytes".to_vec(),
                caption: Caption::Wallpaper,
            }
        );
    }

    #[tokio::test]
    async fn extraction_of_bare_theme_is_text_only() {
        let fetcher = MapFetcher::new(&[("t1", b"a=#1\n")]);
        let request = ExchangeRequest {
            attachment: document("t1", "sample.attheme"),
            reply: None,
        };

        let outcome = execute(&fetcher, plan(request)).await;
        assert_eq!(outcome.reply, Reply::Text(Notice::ThemeHasNoWallpaper));
    }

    #[tokio::test]
    async fn injection_replaces_wallpaper_and_clears_legacy_keys() {
        let theme_raw = b"chat_wallpaper=#ff527da3\naccent=#2\n";
        let png = png_fixture();
        let fetcher = MapFetcher::new(&[("t1", theme_raw.as_slice()), ("i1", &png)]);
        let request = ExchangeRequest {
            attachment: document("i1", "wall.png"),
            reply: Some(reply_document("t1", "sample.attheme")),
        };

        let outcome = execute(&fetcher, plan(request)).await;

        let Reply::Document { file_name, bytes, caption } = outcome.reply else {
            panic!("expected a document reply");
        };
        assert_eq!(file_name, "sample.attheme");
        assert_eq!(caption, Caption::Theme);

        let theme = Attheme::from_bytes(&bytes).unwrap();
        assert_eq!(theme.variable("chat_wallpaper"), None);
        assert_eq!(theme.variable("accent"), Some("#2"));
        let wallpaper = theme.wallpaper.expect("wallpaper set");
        assert_eq!(
            image::guess_format(&wallpaper).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn photo_injection_stores_fetched_bytes_directly() {
        let jpeg = [0xff, 0xd8, 0xff, 0xe0, 9, 9];
        let fetcher = MapFetcher::new(&[("t1", b"a=#1\n"), ("p1", &jpeg)]);
        let request = ExchangeRequest {
            attachment: Attachment::Photo { file: FileRef::new("p1") },
            reply: Some(reply_document("t1", "Night.attheme")),
        };

        let outcome = execute(&fetcher, plan(request)).await;

        let Reply::Document { bytes, .. } = outcome.reply else {
            panic!("expected a document reply");
        };
        let theme = Attheme::from_bytes(&bytes).unwrap();
        assert_eq!(theme.wallpaper.as_deref(), Some(jpeg.as_slice()));
    }

    #[tokio::test]
    async fn malformed_theme_becomes_text_notice() {
        let fetcher = MapFetcher::new(&[("t1", b"not a theme line")]);
        let request = ExchangeRequest {
            attachment: document("t1", "broken.attheme"),
            reply: None,
        };

        let outcome = execute(&fetcher, plan(request)).await;
        assert_eq!(outcome.reply, Reply::Text(Notice::MalformedTheme));
    }

    #[tokio::test]
    async fn fetch_failure_becomes_processing_notice() {
        let fetcher = MapFetcher::new(&[]);
        let request = ExchangeRequest {
            attachment: document("missing", "sample.attheme"),
            reply: None,
        };

        let outcome = execute(&fetcher, plan(request)).await;
        assert_eq!(outcome.reply, Reply::Text(Notice::ProcessingFailed));
    }

    #[tokio::test]
    async fn undecodable_image_becomes_processing_notice() {
        let fetcher =
            MapFetcher::new(&[("t1", b"a=#1\n"), ("i1", b"definitely not a png")]);
        let request = ExchangeRequest {
            attachment: document("i1", "wall.png"),
            reply: Some(reply_document("t1", "sample.attheme")),
        };

        let outcome = execute(&fetcher, plan(request)).await;
        assert_eq!(outcome.reply, Reply::Text(Notice::ProcessingFailed));
    }

    #[tokio::test]
    async fn warning_survives_execution() {
        let fetcher = MapFetcher::new(&[("t1", b"a=#1\nWPS\nJ\nWPE\n")]);
        let request = ExchangeRequest {
            attachment: document("t1", "Day.attheme"),
            reply: Some(ReplyAttachment::Other),
        };

        let outcome = execute(&fetcher, plan(request)).await;
        assert_eq!(outcome.warning, Some(Notice::NoThemeInReply));
        assert!(matches!(outcome.reply, Reply::Document { .. }));
    }
}
