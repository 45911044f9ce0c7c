// SPDX-License-Identifier: MIT
//
// Style state: the attribute bitset plus foreground and background colors.
//
// A `Style` is the accumulated effect of every tag seen so far. The compiler
// keeps one as its target and diffs it against the last emitted style, so
// ordering here matters: attribute flags are declared in SGR code order and
// every emission loop walks `ATTRIBUTES` front to back.

use bitflags::bitflags;
use tim_color::Color;

bitflags! {
    /// Boolean terminal attributes, one bit per SGR style code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attributes: u16 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const BLINK2        = 1 << 5;
        const INVERSE       = 1 << 6;
        const INVISIBLE     = 1 << 7;
        const STRIKETHROUGH = 1 << 8;
        const OVERLINE      = 1 << 9;
    }
}

/// Keyword, flag, SGR set code and SGR clear code for every attribute, in
/// emission order. Bold and dim share clear code 22; the writer compensates
/// by re-setting whichever of the two should survive.
pub(crate) const ATTRIBUTES: [(&str, Attributes, u8, u8); 10] = [
    ("bold", Attributes::BOLD, 1, 22),
    ("dim", Attributes::DIM, 2, 22),
    ("italic", Attributes::ITALIC, 3, 23),
    ("underline", Attributes::UNDERLINE, 4, 24),
    ("blink", Attributes::BLINK, 5, 25),
    ("blink2", Attributes::BLINK2, 6, 26),
    ("inverse", Attributes::INVERSE, 7, 27),
    ("invisible", Attributes::INVISIBLE, 8, 28),
    ("strikethrough", Attributes::STRIKETHROUGH, 9, 29),
    ("overline", Attributes::OVERLINE, 53, 54),
];

impl Attributes {
    /// Looks up the flag named by a style keyword tag.
    #[must_use]
    pub fn from_keyword(name: &str) -> Option<Self> {
        ATTRIBUTES
            .iter()
            .find(|(keyword, ..)| *keyword == name)
            .map(|&(_, flag, ..)| flag)
    }
}

/// Every attribute a terminal turns off when it processes `clear_code`.
/// Only 22 is wider than a single flag.
pub(crate) fn clear_scope(clear_code: u8) -> Attributes {
    if clear_code == 22 {
        return Attributes::BOLD | Attributes::DIM;
    }
    ATTRIBUTES
        .iter()
        .find(|&&(_, _, _, clear)| clear == clear_code)
        .map_or(Attributes::empty(), |&(_, flag, ..)| flag)
}

/// A complete style target: attributes plus optional colors. `None` for a
/// color channel means the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub attributes: Attributes,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl Style {
    /// True when every channel is at its terminal default.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Routes a parsed color to the channel its background flag selects.
    pub(crate) fn set_color(&mut self, color: Color) {
        if color.background {
            self.background = Some(color);
        } else {
            self.foreground = Some(color);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn keywords_map_to_flags() {
        assert_eq!(Attributes::from_keyword("bold"), Some(Attributes::BOLD));
        assert_eq!(
            Attributes::from_keyword("strikethrough"),
            Some(Attributes::STRIKETHROUGH),
        );
        assert_eq!(Attributes::from_keyword("underlined"), None);
    }

    #[test]
    fn set_and_clear_codes_follow_sgr() {
        let codes: Vec<(u8, u8)> = ATTRIBUTES
            .iter()
            .map(|&(_, _, set, clear)| (set, clear))
            .collect();
        assert_eq!(
            codes,
            [
                (1, 22),
                (2, 22),
                (3, 23),
                (4, 24),
                (5, 25),
                (6, 26),
                (7, 27),
                (8, 28),
                (9, 29),
                (53, 54),
            ],
        );
    }

    #[test]
    fn clear_scope_of_22_covers_bold_and_dim() {
        assert_eq!(clear_scope(22), Attributes::BOLD | Attributes::DIM);
        assert_eq!(clear_scope(23), Attributes::ITALIC);
        assert_eq!(clear_scope(54), Attributes::OVERLINE);
        assert_eq!(clear_scope(99), Attributes::empty());
    }

    #[test]
    fn colors_route_by_background_flag() {
        let mut style = Style::default();
        style.set_color(Color::from_indexed(141));
        style.set_color(Color::from_indexed(60).with_background(true));

        assert_eq!(style.foreground, Some(Color::from_indexed(141)));
        assert_eq!(
            style.background,
            Some(Color::from_indexed(60).with_background(true)),
        );
        assert!(!style.is_default());
    }
}
