// SPDX-License-Identifier: MIT
//
// The color type behind markup color tags.
//
// A color is a value plus a background flag. Values come in four shapes,
// mirroring the literal forms markup accepts:
//
//   Ansi(0-15)      standard palette, emitted as compact SGR (31, 91, ...)
//   Indexed(16-255) xterm-256 palette, emitted as 38;5;N
//   Rgb(r, g, b)    true color, emitted as 38;2;r;g;b
//   Named("coral")  CSS keyword, true color with a name attached
//
// Colors degrade downward at emission time: a true-color value renders on
// an eight-bit terminal by cube quantization, on a standard terminal by
// redmean nearest-match, and under NO_COLOR by dropping onto the greyscale
// ramp. Degradation never moves a color up a tier.

use std::fmt;

use crate::contrast;
use crate::named;
use crate::palette;
use crate::system::ColorSystem;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failure to interpret a string as a color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The string is a color literal, but a component falls outside its
    /// range (an index above 255, a malformed hex body, an RGB part
    /// above 255).
    #[error("color component out of range: {0:?}")]
    OutOfRange(String),

    /// The string does not look like any color literal form.
    #[error("not a color: {0:?}")]
    Unrecognized(String),

    /// An unknown color system name was given (see [`ColorSystem`]).
    #[error("unknown color system: {0:?}")]
    UnknownSystem(String),
}

// ─── Color values ────────────────────────────────────────────────────────────

/// The payload of a [`Color`], one variant per palette tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorValue {
    /// Index into the standard 16-color palette.
    Ansi(u8),

    /// Index into the xterm-256 palette (16-231 cube, 232-255 ramp).
    Indexed(u8),

    /// 24-bit RGB components.
    Rgb(u8, u8, u8),

    /// A CSS color keyword; resolves to RGB on demand.
    Named(&'static str),
}

/// A terminal color with its foreground/background role.
///
/// # Examples
///
/// ```
/// use tim_color::{Color, ColorSystem};
///
/// let coral = Color::parse("#ff7f50").unwrap();
/// assert_eq!(coral.rgb(), (255, 127, 80));
///
/// let bg = Color::parse("@141").unwrap();
/// assert!(bg.background);
/// assert_eq!(bg.degrade(ColorSystem::EightBit), bg);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// The color itself.
    pub value: ColorValue,

    /// Whether this colors the cell background rather than the glyph.
    pub background: bool,
}

impl Color {
    // ─── Constructors ────────────────────────────────────────────────────

    /// A true-color foreground value.
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            value: ColorValue::Rgb(r, g, b),
            background: false,
        }
    }

    /// A palette foreground value. Indices below 16 land in the standard
    /// palette, the rest in xterm-256.
    #[must_use]
    pub const fn from_indexed(index: u8) -> Self {
        let value = if index < 16 {
            ColorValue::Ansi(index)
        } else {
            ColorValue::Indexed(index)
        };

        Self {
            value,
            background: false,
        }
    }

    /// Flips the foreground/background role.
    #[must_use]
    pub const fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    // ─── Parsing ─────────────────────────────────────────────────────────

    /// Parses a color literal.
    ///
    /// Accepted forms, after an optional `@` background prefix:
    ///
    /// - `0`-`255`: a palette index
    /// - `rrr;ggg;bbb`: decimal RGB components
    /// - `#rrggbb` or bare `rrggbb`: hex RGB
    /// - a CSS color keyword such as `skyblue`
    ///
    /// Wire-format SGR fragments (`38;5;141m`, `48;2;255;0;0m`) are
    /// trimmed down to their payload first, with `48;` implying a
    /// background color.
    ///
    /// # Errors
    ///
    /// [`ColorError::OutOfRange`] when the literal form is recognized but
    /// a component does not fit; [`ColorError::Unrecognized`] when the
    /// string matches no form at all.
    pub fn parse(text: &str) -> Result<Self, ColorError> {
        let (text, mut background) = trim_sgr_fragment(text);

        let text = match text.strip_prefix('@') {
            Some(rest) => {
                background = true;
                rest
            }
            None => text,
        };

        if let Some((canonical, _)) = named::css_entry(text) {
            return Ok(Self {
                value: ColorValue::Named(canonical),
                background,
            });
        }

        // One to three digits: a palette index.
        if !text.is_empty() && text.len() <= 3 && text.bytes().all(|b| b.is_ascii_digit()) {
            return match text.parse::<u8>() {
                Ok(index) => Ok(Self::from_indexed(index).with_background(background)),
                Err(_) => Err(ColorError::OutOfRange(text.to_owned())),
            };
        }

        // A leading hash commits the literal to hex form.
        if let Some(body) = text.strip_prefix('#') {
            return parse_hex(body)
                .map(|(r, g, b)| Self {
                    value: ColorValue::Rgb(r, g, b),
                    background,
                })
                .ok_or_else(|| ColorError::OutOfRange(text.to_owned()));
        }

        if let Some((r, g, b)) = parse_hex(text) {
            return Ok(Self {
                value: ColorValue::Rgb(r, g, b),
                background,
            });
        }

        if looks_like_rgb_triple(text) {
            let mut channels = [0_u8; 3];
            for (slot, part) in channels.iter_mut().zip(text.split(';')) {
                *slot = part
                    .parse()
                    .map_err(|_| ColorError::OutOfRange(text.to_owned()))?;
            }

            return Ok(Self {
                value: ColorValue::Rgb(channels[0], channels[1], channels[2]),
                background,
            });
        }

        Err(ColorError::Unrecognized(text.to_owned()))
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// The RGB components, resolving palette indices and CSS names.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self.value {
            ColorValue::Ansi(index) | ColorValue::Indexed(index) => palette::ansi256_to_rgb(index),
            ColorValue::Rgb(r, g, b) => (r, g, b),
            ColorValue::Named(name) => named::css_color(name).unwrap_or((0, 0, 0)),
        }
    }

    /// The color system this value natively belongs to.
    #[must_use]
    pub const fn system(self) -> ColorSystem {
        match self.value {
            ColorValue::Ansi(_) => ColorSystem::Standard,
            ColorValue::Indexed(_) => ColorSystem::EightBit,
            ColorValue::Rgb(..) | ColorValue::Named(_) => ColorSystem::True,
        }
    }

    /// The markup literal for this color, e.g. `@141` or `255;0;0`.
    #[must_use]
    pub fn markup(self) -> String {
        let prefix = if self.background { "@" } else { "" };

        match self.value {
            ColorValue::Ansi(index) | ColorValue::Indexed(index) => format!("{prefix}{index}"),
            ColorValue::Rgb(r, g, b) => format!("{prefix}{r};{g};{b}"),
            ColorValue::Named(name) => format!("{prefix}{name}"),
        }
    }

    // ─── Degradation ─────────────────────────────────────────────────────

    /// Re-expresses this color within the given system's capabilities.
    ///
    /// A color already at or below the target tier is returned unchanged.
    /// Otherwise it drops through its RGB components: cube quantization
    /// for eight-bit, redmean nearest-match for the standard palette, and
    /// a perceived-brightness slot on the greyscale ramp for no-color.
    #[must_use]
    pub fn degrade(self, target: ColorSystem) -> Self {
        if self.system() <= target {
            return self;
        }

        let (r, g, b) = self.rgb();
        let value = match target {
            ColorSystem::True => ColorValue::Rgb(r, g, b),
            ColorSystem::EightBit => ColorValue::Indexed(palette::rgb_to_ansi256(r, g, b)),
            ColorSystem::Standard => ColorValue::Ansi(palette::rgb_to_ansi16(r, g, b)),
            ColorSystem::NoColor => {
                ColorValue::Indexed(palette::greyscale_index(contrast::brightness((r, g, b))))
            }
        };

        Self {
            value,
            background: self.background,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup())
    }
}

// ─── Literal helpers ─────────────────────────────────────────────────────────

/// Strips SGR wire framing from a literal that consists only of digits,
/// `;` and `m`: the `38;5;`/`48;5;`/`38;2;`/`48;2;` introducers and a
/// trailing `m`. A `48;` introducer marks the color as background.
fn trim_sgr_fragment(code: &str) -> (&str, bool) {
    if !code
        .chars()
        .all(|c| c.is_ascii_digit() || c == ';' || c == 'm')
    {
        return (code, false);
    }

    let background = code.starts_with("48;");

    let code = if code.starts_with("38;5;")
        || code.starts_with("48;5;")
        || code.starts_with("38;2;")
        || code.starts_with("48;2;")
    {
        &code[5..]
    } else {
        code
    };

    (code.strip_suffix('m').unwrap_or(code), background)
}

fn parse_hex(body: &str) -> Option<(u8, u8, u8)> {
    if body.len() != 6 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&body[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Three `;`-separated runs of one to three digits.
fn looks_like_rgb_triple(text: &str) -> bool {
    let mut parts = 0;
    for part in text.split(';') {
        parts += 1;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    parts == 3
}

// ─── Tests ───────────────────────────────────────────────────────────────────
