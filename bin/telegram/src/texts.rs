//! English reply texts. Multi-language support is out of scope; only the
//! English table ships.

use attheme_bot_core::{Caption, Notice};

pub fn start_message() -> &'static str {
    "Hello! I'm a bot that can extract images from Android Telegram themes \
     or put them. Just send me one, I'll send back the wallpaper."
}

pub fn help_message() -> &'static str {
    "*Hello!* I'm a bot that can extract images from .attheme files or put \
     images in them. To extract a wallpaper, just send me a theme. If you \
     want to put a wallpaper, send me the theme and then send the image (as \
     an image or a `jpg`, `png`, `bmp` document) in reply to that theme. \
     I'll reply you with the new theme removing the old wallpaper."
}

pub fn caption_text(caption: Caption) -> &'static str {
    match caption {
        Caption::Wallpaper => "Here's the wallpaper!",
        Caption::Theme => "Nice wallpaper, I've added it to the theme!",
    }
}

pub fn notice_text(notice: Notice) -> &'static str {
    match notice {
        Notice::ThemeHasNoWallpaper => {
            "Hmm, it looks like your theme doesn't have a wallpaper. But I \
             can put one inside it! Just send an image in reply to this \
             theme."
        }
        Notice::NoThemeInReply => {
            "Hmm, doesn't seem the message you replied to has a theme. Try \
             again."
        }
        Notice::UnknownFileExtension => {
            "Hmm, I don't know such theme or image extension. For themes, it \
             must be .attheme; for images, it must be `jpg`, `png`, `bmp` \
             file."
        }
        Notice::ImageWithNoReply => {
            "Ehm, if you want me to put a wallpaper inside a theme, you \
             should reply to the message with that theme."
        }
        Notice::MalformedTheme => {
            "I couldn't read that theme file. Are you sure it's a valid \
             .attheme?"
        }
        Notice::ProcessingFailed => {
            "Something went wrong while processing your file. Please try \
             again."
        }
    }
}
