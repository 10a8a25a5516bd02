//! Styles for prompts, errors and the banner
//!
//! Painting is done by `nu_ansi_term`; this module adds the session's
//! default palette and a parser for user-supplied color names.

use thiserror::Error;

pub use nu_ansi_term::{Color, Style};

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("invalid color {0:?}, expected a color name or #rrggbb")]
pub struct ColorParseError(pub String);

/// Parse a color name (`green`, `bright-cyan`, `grey`) or a `#rrggbb`
/// truecolor string.
pub fn parse_color(s: &str) -> Result<Color, ColorParseError> {
    use Color::*;

    let name = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");

    if let Some(hex) = name.strip_prefix('#') {
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
        };

        return match (hex.len(), channel(0), channel(2), channel(4)) {
            (6, Some(r), Some(g), Some(b)) => Ok(Rgb(r, g, b)),
            _ => Err(ColorParseError(s.to_string())),
        };
    }

    Ok(match name.as_str() {
        "black" => Black,
        "red" => Red,
        "green" => Green,
        "yellow" => Yellow,
        "blue" => Blue,
        "magenta" | "purple" => Magenta,
        "cyan" => Cyan,
        "white" => White,
        "brightblack" | "gray" | "grey" => DarkGray,
        "brightred" => LightRed,
        "brightgreen" => LightGreen,
        "brightyellow" => LightYellow,
        "brightblue" => LightBlue,
        "brightmagenta" => LightMagenta,
        "brightcyan" => LightCyan,
        "brightwhite" => LightGray,
        _ => return Err(ColorParseError(s.to_string())),
    })
}

/// Styles used by the session for its own output
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Styles {
    pub prompt: Style,
    pub error: Style,
    pub banner: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            prompt: Color::Green.normal(),
            error: Color::Red.normal(),
            banner: Color::DarkGray.normal(),
        }
    }
}
