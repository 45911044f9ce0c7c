// SPDX-License-Identifier: MIT
//
// ANSI emission.
//
// The writer holds the last style it put on the wire and turns each target
// style into one minimal SGR sequence: clear codes for dropped attributes,
// set codes for gained ones, then color parameters, all joined into a single
// `ESC[...m`. Equal styles emit nothing. Colors degrade to the writer's
// color system here, at the last moment, so everything upstream works with
// the colors exactly as written.

use tim_color::{Color, ColorSystem, ColorValue};

use crate::style::{clear_scope, Attributes, Style, ATTRIBUTES};

pub(crate) const RESET: &str = "\x1b[0m";

/// Terminator of an OSC 8 hyperlink.
pub(crate) const OSC8_CLOSE: &str = "\x1b]8;;\x1b\\";

/// Opens an OSC 8 hyperlink around subsequent text.
pub(crate) fn osc8_open(uri: &str) -> String {
    format!("\x1b]8;;{uri}\x1b\\")
}

/// Cursor positioning, row before column. A zero coordinate leaves its
/// parameter empty so the terminal applies its default for that axis.
pub(crate) fn cursor_to(x: i32, y: i32) -> String {
    let x = if x == 0 { String::new() } else { x.to_string() };
    let y = if y == 0 { String::new() } else { y.to_string() };
    format!("\x1b[{y};{x}H")
}

/// Emits style transitions as minimal SGR sequences.
pub(crate) struct StyleWriter {
    system: ColorSystem,
    emitted: Style,
}

impl StyleWriter {
    pub(crate) fn new(system: ColorSystem) -> Self {
        Self {
            system,
            emitted: Style::default(),
        }
    }

    /// Appends whatever sequence moves the terminal from the last emitted
    /// style to `target`. No-op when they already agree.
    pub(crate) fn transition(&mut self, out: &mut String, target: &Style) {
        if *target == self.emitted {
            return;
        }

        let mut params: Vec<String> = Vec::new();

        if target.is_default() {
            params.push("0".to_owned());
        } else {
            self.attribute_params(&mut params, target);
            if target.foreground != self.emitted.foreground {
                color_params(&mut params, target.foreground, false, self.system);
            }
            if target.background != self.emitted.background {
                color_params(&mut params, target.background, true, self.system);
            }
        }

        out.push_str("\x1b[");
        out.push_str(&params.join(";"));
        out.push('m');
        self.emitted = *target;
    }

    /// Clear codes for dropped attributes, then set codes for gained ones.
    /// Code 22 clears both bold and dim, so dropping one of the pair
    /// re-sets the survivor instead of emitting 22 twice.
    fn attribute_params(&self, params: &mut Vec<String>, target: &Style) {
        let dropped = self.emitted.attributes - target.attributes;

        let mut cleared = Attributes::empty();
        for &(_, flag, _, clear) in &ATTRIBUTES {
            if dropped.contains(flag) && !cleared.contains(flag) {
                params.push(clear.to_string());
                cleared |= clear_scope(clear);
            }
        }

        let surviving = self.emitted.attributes - cleared;
        let wanted = target.attributes - surviving;
        for &(_, flag, set, _) in &ATTRIBUTES {
            if wanted.contains(flag) {
                params.push(set.to_string());
            }
        }
    }

    /// True when the terminal was left in a non-default style.
    pub(crate) fn needs_final_reset(&self) -> bool {
        !self.emitted.is_default()
    }
}

/// Pushes the SGR parameters selecting `color` on one channel. `None` means
/// back to the terminal default for that channel.
fn color_params(
    params: &mut Vec<String>,
    color: Option<Color>,
    background: bool,
    system: ColorSystem,
) {
    let Some(color) = color else {
        params.push(if background { "49" } else { "39" }.to_owned());
        return;
    };

    let color = color.degrade(system);
    let offset: u8 = if background { 10 } else { 0 };

    match color.value {
        ColorValue::Ansi(index) => {
            // 30-37 and 40-47, with the bright half up at 90-97 and 100-107.
            let code = if index < 8 { 30 + index } else { 82 + index };
            params.push((code + offset).to_string());
        }
        ColorValue::Indexed(index) => {
            params.push((38 + offset).to_string());
            params.push("5".to_owned());
            params.push(index.to_string());
        }
        ColorValue::Rgb(..) | ColorValue::Named(_) => {
            let (r, g, b) = color.rgb();
            params.push((38 + offset).to_string());
            params.push("2".to_owned());
            params.push(r.to_string());
            params.push(g.to_string());
            params.push(b.to_string());
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn emit(writer: &mut StyleWriter, target: &Style) -> String {
        let mut out = String::new();
        writer.transition(&mut out, target);
        out
    }

    // ── Sequence builders ──

    #[test]
    fn cursor_sequences_put_the_row_first() {
        assert_eq!(cursor_to(10, 2), "\x1b[2;10H");
        assert_eq!(cursor_to(0, 5), "\x1b[5;H");
        assert_eq!(cursor_to(3, 0), "\x1b[;3H");
    }

    #[test]
    fn hyperlink_sequences_wrap_the_uri() {
        assert_eq!(osc8_open("https://example.com"), "\x1b]8;;https://example.com\x1b\\");
        assert_eq!(OSC8_CLOSE, "\x1b]8;;\x1b\\");
    }

    // ── Transitions ──

    #[test]
    fn equal_styles_emit_nothing() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        assert_eq!(emit(&mut writer, &Style::default()), "");
        assert!(!writer.needs_final_reset());
    }

    #[test]
    fn gaining_attributes_and_color_is_one_sequence() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        let target = Style {
            attributes: Attributes::BOLD | Attributes::ITALIC,
            foreground: Some(Color::from_rgb(255, 0, 0)),
            background: None,
        };
        assert_eq!(emit(&mut writer, &target), "\x1b[1;3;38;2;255;0;0m");
    }

    #[test]
    fn dropping_bold_never_touches_italic() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        let both = Style {
            attributes: Attributes::BOLD | Attributes::ITALIC,
            ..Style::default()
        };
        emit(&mut writer, &both);

        let italic_only = Style {
            attributes: Attributes::ITALIC,
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &italic_only), "\x1b[22m");
    }

    #[test]
    fn dropping_bold_re_sets_a_surviving_dim() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        let both = Style {
            attributes: Attributes::BOLD | Attributes::DIM,
            ..Style::default()
        };
        emit(&mut writer, &both);

        let dim_only = Style {
            attributes: Attributes::DIM,
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &dim_only), "\x1b[22;2m");
    }

    #[test]
    fn dropping_both_bold_and_dim_emits_22_once() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        let both = Style {
            attributes: Attributes::BOLD | Attributes::DIM,
            ..Style::default()
        };
        emit(&mut writer, &both);
        assert_eq!(emit(&mut writer, &Style::default()), "\x1b[0m");

        // Through a non-default target the pair still collapses to one 22.
        let mut writer = StyleWriter::new(ColorSystem::True);
        let loaded = Style {
            attributes: Attributes::BOLD | Attributes::DIM | Attributes::ITALIC,
            ..Style::default()
        };
        emit(&mut writer, &loaded);
        let italic_only = Style {
            attributes: Attributes::ITALIC,
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &italic_only), "\x1b[22m");
    }

    #[test]
    fn returning_to_default_is_a_bare_reset() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        let styled = Style {
            attributes: Attributes::UNDERLINE,
            foreground: Some(Color::from_indexed(141)),
            background: None,
        };
        emit(&mut writer, &styled);
        assert!(writer.needs_final_reset());
        assert_eq!(emit(&mut writer, &Style::default()), "\x1b[0m");
        assert!(!writer.needs_final_reset());
    }

    #[test]
    fn clearing_one_channel_uses_its_default_code() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        let colored = Style {
            foreground: Some(Color::from_indexed(141)),
            background: Some(Color::from_indexed(60).with_background(true)),
            ..Style::default()
        };
        emit(&mut writer, &colored);

        let background_only = Style {
            foreground: None,
            ..colored
        };
        assert_eq!(emit(&mut writer, &background_only), "\x1b[39m");
    }

    // ── Color parameters and degradation ──

    #[test]
    fn color_codes_follow_the_color_kind() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        let ansi_bg = Style {
            background: Some(Color::parse("@1").unwrap()),
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &ansi_bg), "\x1b[41m");

        let mut writer = StyleWriter::new(ColorSystem::True);
        let bright = Style {
            foreground: Some(Color::parse("9").unwrap()),
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &bright), "\x1b[91m");

        let mut writer = StyleWriter::new(ColorSystem::True);
        let indexed = Style {
            foreground: Some(Color::from_indexed(141)),
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &indexed), "\x1b[38;5;141m");
    }

    #[test]
    fn colors_degrade_to_the_writer_system() {
        let mut writer = StyleWriter::new(ColorSystem::Standard);
        let red = Style {
            foreground: Some(Color::from_rgb(255, 0, 0)),
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &red), "\x1b[91m");

        let mut writer = StyleWriter::new(ColorSystem::EightBit);
        let red = Style {
            foreground: Some(Color::from_rgb(255, 0, 0)),
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &red), "\x1b[38;5;196m");
    }

    #[test]
    fn named_colors_emit_their_rgb() {
        let mut writer = StyleWriter::new(ColorSystem::True);
        let lime = Style {
            foreground: Some(Color::parse("lime").unwrap()),
            ..Style::default()
        };
        assert_eq!(emit(&mut writer, &lime), "\x1b[38;2;0;255;0m");
    }
}
