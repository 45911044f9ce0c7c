//! Terminal color capability tiers and their detection.
//!
//! Terminals fall into four tiers: no color at all (the NO_COLOR
//! convention), the standard 16 colors, the xterm 256 palette, and
//! 24-bit "true" color. Every color knows which tier it needs, and
//! degradation walks colors down to whatever tier the terminal
//! actually supports.
//!
//! Detection reads the conventional environment variables once; the
//! decision logic itself is a pure function over their values so tests
//! never have to mutate the process environment.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::color::ColorError;

/// A terminal's color capability tier, orderable by fidelity.
///
/// `NoColor < Standard < EightBit < True`: a color is representable on
/// a terminal whenever its own tier is `<=` the terminal's tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorSystem {
    /// No color output. Colors map onto the greyscale ramp so relative
    /// brightness survives.
    NoColor,
    /// The basic 16 ANSI colors.
    Standard,
    /// The xterm 256-color palette.
    EightBit,
    /// 24-bit RGB.
    True,
}

impl ColorSystem {
    /// Detect the tier of the current terminal from the environment.
    ///
    /// Sources, in priority order: a `TIM_COLORSYS` override, the
    /// `NO_COLOR` convention, `COLORTERM` (`truecolor`/`24bit`), and a
    /// `256color` marker in either `COLORTERM` or `TERM`. Anything
    /// else is assumed to be a standard 16-color terminal.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_env_parts(
            env::var("TIM_COLORSYS").ok().as_deref(),
            env::var("NO_COLOR").ok().as_deref(),
            env::var("COLORTERM").ok().as_deref(),
            env::var("TERM").ok().as_deref(),
        )
    }

    /// The detection decision, spelled out over raw variable values.
    #[must_use]
    pub fn from_env_parts(
        forced: Option<&str>,
        no_color: Option<&str>,
        colorterm: Option<&str>,
        term: Option<&str>,
    ) -> Self {
        if let Some(forced) = forced {
            if let Ok(system) = forced.parse() {
                return system;
            }
        }

        if no_color.is_some() {
            return Self::NoColor;
        }

        let colorterm = colorterm.unwrap_or("").trim().to_ascii_lowercase();
        if matches!(colorterm.as_str(), "truecolor" | "24bit") {
            return Self::True;
        }

        if colorterm.contains("256color") || term.unwrap_or("").contains("256color") {
            return Self::EightBit;
        }

        Self::Standard
    }

    /// Stable lowercase name, reverse-parseable by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoColor => "no_color",
            Self::Standard => "standard",
            Self::EightBit => "eight_bit",
            Self::True => "true",
        }
    }
}

impl fmt::Display for ColorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorSystem {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "no_color" | "no" | "none" => Ok(Self::NoColor),
            "standard" | "ansi" | "16" => Ok(Self::Standard),
            "eight_bit" | "256" => Ok(Self::EightBit),
            "true" | "truecolor" | "24bit" => Ok(Self::True),
            _ => Err(ColorError::UnknownSystem(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
