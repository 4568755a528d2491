//! Codec for Telegram's `.attheme` theme-file format.
//!
//! A theme file is a sequence of `key=value` lines (values are colors such as
//! `#AARRGGBB` or bare integers; this crate keeps them opaque) plus at most
//! one embedded binary wallpaper delimited by `WPS\n` ... `\nWPE` markers.
//! Key order is significant and preserved across a parse/serialize
//! round-trip.

use thiserror::Error;

/// Marker line that opens the embedded wallpaper section.
const WALLPAPER_START: &[u8] = b"WPS";
/// Byte sequence that closes the embedded wallpaper section.
const WALLPAPER_END: &[u8] = b"\nWPE";

/// Variables that referenced the wallpaper in older theme versions. They must
/// not survive a wallpaper change, or clients pick up the stale reference.
pub const LEGACY_WALLPAPER_KEYS: [&str; 2] =
    ["chat_wallpaper", "chat_wallpaper_gradient_to"];

/// Errors produced while parsing raw theme bytes. Parsing is strict: there is
/// no partial recovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A variable line had no `=` separator.
    #[error("line {line} has no `=` separator")]
    MissingSeparator { line: usize },

    /// A variable line was not valid UTF-8.
    #[error("line {line} is not valid UTF-8")]
    InvalidUtf8 { line: usize },

    /// A `WPS` marker was never closed by `WPE`.
    #[error("wallpaper section is missing its closing WPE marker")]
    UnterminatedWallpaper,
}

/// An in-memory theme document: ordered variables plus an optional binary
/// wallpaper payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attheme {
    variables: Vec<(String, String)>,
    pub wallpaper: Option<Vec<u8>>,
}

impl Attheme {
    /// Parses raw theme bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut theme = Attheme::default();
        let mut pos = 0;
        let mut line_number = 1;

        while pos < bytes.len() {
            let line_end = bytes[pos..]
                .iter()
                .position(|&byte| byte == b'\n')
                .map(|offset| pos + offset)
                .unwrap_or(bytes.len());
            let line = &bytes[pos..line_end];

            if line == WALLPAPER_START {
                let payload_start = (line_end + 1).min(bytes.len());
                let payload_len = find(&bytes[payload_start..], WALLPAPER_END)
                    .ok_or(ParseError::UnterminatedWallpaper)?;
                theme.wallpaper = Some(
                    bytes[payload_start..payload_start + payload_len].to_vec(),
                );

                pos = payload_start + payload_len + WALLPAPER_END.len();
                if bytes.get(pos) == Some(&b'\n') {
                    pos += 1;
                }
                line_number += 1;
                continue;
            }

            if !line.is_empty() {
                let text = std::str::from_utf8(line)
                    .map_err(|_| ParseError::InvalidUtf8 { line: line_number })?;
                let (key, value) = text
                    .split_once('=')
                    .ok_or(ParseError::MissingSeparator { line: line_number })?;
                theme.set_variable(key, value);
            }

            pos = line_end + 1;
            line_number += 1;
        }

        Ok(theme)
    }

    /// Serializes the document: variables in order, wallpaper section last.
    pub fn to_bytes(&self) -> Vec<u8> {
        let wallpaper_len = self
            .wallpaper
            .as_ref()
            .map(|payload| payload.len() + 16)
            .unwrap_or(0);
        let mut bytes = Vec::with_capacity(self.variables.len() * 24 + wallpaper_len);

        for (key, value) in &self.variables {
            bytes.extend_from_slice(key.as_bytes());
            bytes.push(b'=');
            bytes.extend_from_slice(value.as_bytes());
            bytes.push(b'\n');
        }

        if let Some(payload) = &self.wallpaper {
            bytes.extend_from_slice(WALLPAPER_START);
            bytes.push(b'\n');
            bytes.extend_from_slice(payload);
            bytes.extend_from_slice(WALLPAPER_END);
            bytes.push(b'\n');
        }

        bytes
    }

    /// Looks up a variable by key.
    pub fn variable(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a variable, overwriting in place or appending at the end.
    pub fn set_variable(&mut self, key: &str, value: &str) {
        match self.variables.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, existing_value)) => *existing_value = value.to_string(),
            None => self.variables.push((key.to_string(), value.to_string())),
        }
    }

    /// Removes a variable, returning its value if it was present.
    pub fn remove_variable(&mut self, key: &str) -> Option<String> {
        let index = self
            .variables
            .iter()
            .position(|(existing, _)| existing == key)?;
        Some(self.variables.remove(index).1)
    }

    pub fn has_wallpaper(&self) -> bool {
        self.wallpaper.is_some()
    }

    /// Stores a new wallpaper payload and drops the legacy wallpaper
    /// variables so no stale reference survives the swap.
    pub fn set_wallpaper(&mut self, payload: Vec<u8>) {
        self.wallpaper = Some(payload);
        for key in LEGACY_WALLPAPER_KEYS {
            self.remove_variable(key);
        }
    }

    /// Iterates variables in document order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// First position of `needle` in `haystack`, if any.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"windowBackgroundWhite=#ffffffff\nchat_wallpaper=#ff527da3\n";

    #[test]
    fn parses_variables_in_order() {
        let theme = Attheme::from_bytes(SAMPLE).unwrap();
        let variables: Vec<_> = theme.variables().collect();
        assert_eq!(
            variables,
            vec![
                ("windowBackgroundWhite", "#ffffffff"),
                ("chat_wallpaper", "#ff527da3"),
            ]
        );
        assert!(!theme.has_wallpaper());
    }

    #[test]
    fn parses_wallpaper_section() {
        let mut raw = SAMPLE.to_vec();
        raw.extend_from_slice(b"WPS\n\xff\xd8binary\npayload\nWPE\n");

        let theme = Attheme::from_bytes(&raw).unwrap();
        assert_eq!(
            theme.wallpaper.as_deref(),
            Some(b"\xff\xd8binary\npayload".as_slice())
        );
    }

    #[test]
    fn round_trip_preserves_everything() {
        let mut raw = SAMPLE.to_vec();
        raw.extend_from_slice(b"WPS\n\x00\x01\x02\nWPE\n");

        let theme = Attheme::from_bytes(&raw).unwrap();
        assert_eq!(theme.to_bytes(), raw);
    }

    #[test]
    fn round_trip_without_wallpaper() {
        let theme = Attheme::from_bytes(SAMPLE).unwrap();
        assert_eq!(theme.to_bytes(), SAMPLE);
    }

    #[test]
    fn missing_separator_is_rejected() {
        let error = Attheme::from_bytes(b"windowBackgroundWhite=#fff\nnonsense\n")
            .unwrap_err();
        assert_eq!(error, ParseError::MissingSeparator { line: 2 });
    }

    #[test]
    fn unterminated_wallpaper_is_rejected() {
        let error = Attheme::from_bytes(b"a=#1\nWPS\n\x00\x01").unwrap_err();
        assert_eq!(error, ParseError::UnterminatedWallpaper);
    }

    #[test]
    fn empty_input_parses_to_empty_theme() {
        let theme = Attheme::from_bytes(b"").unwrap();
        assert_eq!(theme, Attheme::default());
    }

    #[test]
    fn set_variable_overwrites_in_place() {
        let mut theme = Attheme::from_bytes(SAMPLE).unwrap();
        theme.set_variable("windowBackgroundWhite", "#ff000000");

        let variables: Vec<_> = theme.variables().collect();
        assert_eq!(variables[0], ("windowBackgroundWhite", "#ff000000"));
        assert_eq!(variables.len(), 2);
    }

    #[test]
    fn set_wallpaper_clears_legacy_keys() {
        let mut theme = Attheme::from_bytes(
            b"chat_wallpaper=#ff527da3\nchat_wallpaper_gradient_to=#ff2b5278\nfoo=#1\n",
        )
        .unwrap();

        theme.set_wallpaper(vec![0xff, 0xd8]);

        assert_eq!(theme.wallpaper.as_deref(), Some([0xff, 0xd8].as_slice()));
        assert_eq!(theme.variable("chat_wallpaper"), None);
        assert_eq!(theme.variable("chat_wallpaper_gradient_to"), None);
        assert_eq!(theme.variable("foo"), Some("#1"));
    }

    #[test]
    fn set_wallpaper_without_legacy_keys_is_fine() {
        let mut theme = Attheme::default();
        theme.set_wallpaper(vec![1, 2, 3]);
        assert_eq!(theme.wallpaper.as_deref(), Some([1, 2, 3].as_slice()));
    }

    #[test]
    fn wallpaper_payload_may_contain_marker_like_bytes() {
        // "WPE" without a leading newline must not close the section.
        let raw = b"WPS\nabcWPEdef\nWPE\n";
        let theme = Attheme::from_bytes(raw).unwrap();
        assert_eq!(theme.wallpaper.as_deref(), Some(b"abcWPEdef".as_slice()));
    }
}
