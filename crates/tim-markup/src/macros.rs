// SPDX-License-Identifier: MIT
//
// Text macros.
//
// A macro is a function from its markup arguments and a stretch of plain
// text to replacement text. Activation is positional: `[!upper]` applies to
// every plain run until it is cleared. Macro output may itself contain
// markup; the compiler re-scans it, which is how gradient and rainbow work.
//
// Errors are strings. A failing macro surfaces as a diagnostic on the parse
// result and leaves its input text untouched.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A macro body: `(args, text) -> transformed text`.
pub type MacroFn = Arc<dyn Fn(&[String], &str) -> Result<String, String> + Send + Sync>;

/// The macros every context starts with.
pub(crate) fn builtins() -> FxHashMap<String, MacroFn> {
    let entries: [(&str, fn(&[String], &str) -> Result<String, String>); 7] = [
        ("upper", upper),
        ("lower", lower),
        ("capitalize", capitalize),
        ("title", title),
        ("align", align),
        ("gradient", gradient),
        ("rainbow", rainbow),
    ];

    entries
        .into_iter()
        .map(|(name, func)| (name.to_owned(), Arc::new(func) as MacroFn))
        .collect()
}

fn expect_no_args(name: &str, args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(format!("{name} takes no arguments"))
    }
}

fn upper(args: &[String], text: &str) -> Result<String, String> {
    expect_no_args("upper", args)?;
    Ok(text.to_uppercase())
}

fn lower(args: &[String], text: &str) -> Result<String, String> {
    expect_no_args("lower", args)?;
    Ok(text.to_lowercase())
}

/// Uppercases the first character and lowercases the rest.
fn capitalize(args: &[String], text: &str) -> Result<String, String> {
    expect_no_args("capitalize", args)?;
    let mut chars = text.chars();
    Ok(match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    })
}

/// Uppercases every letter that follows a non-letter. Mirrors the classic
/// title-case rule, apostrophes included: `it's` becomes `It'S`.
fn title(args: &[String], text: &str) -> Result<String, String> {
    expect_no_args("title", args)?;
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    Ok(out)
}

/// `[!align(width:side)]`: pads with spaces to `width` terminal columns.
/// Sides are `left` and `right`; anything else centers, extra space going
/// to the right.
fn align(args: &[String], text: &str) -> Result<String, String> {
    let [width, side] = args else {
        return Err("align takes width:side".to_owned());
    };
    let width: usize = width
        .parse()
        .map_err(|_| format!("align width must be an integer, got {width:?}"))?;

    let current = text.width();
    if width <= current {
        return Ok(text.to_owned());
    }

    let pad = width - current;
    Ok(match side.as_str() {
        "left" => format!("{text}{}", " ".repeat(pad)),
        "right" => format!("{}{text}", " ".repeat(pad)),
        _ => {
            let left = pad / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(pad - left))
        }
    })
}

/// `[!gradient(base)]`: six-step color run along the 256-color cube,
/// starting from `base` normalized into the first cube row.
fn gradient(args: &[String], text: &str) -> Result<String, String> {
    let [base] = args else {
        return Err("gradient takes a base color index".to_owned());
    };
    let base: u8 = base
        .parse()
        .map_err(|_| format!("gradient base must be a color index, got {base:?}"))?;
    if !(16..=231).contains(&base) {
        return Err(format!("gradient base must be between 16 and 231, got {base}"));
    }

    let mut base = base;
    while base > 52 {
        base -= 36;
    }

    let colors: Vec<String> = (0..6u8).map(|i| (base + 36 * i).to_string()).collect();
    Ok(spread_colors(&colors, text))
}

const RAINBOW: [&str; 7] = ["red", "orange", "yellow", "green", "blue", "indigo", "violet"];

/// `[!rainbow]`: the seven classic colors spread across the text.
fn rainbow(args: &[String], text: &str) -> Result<String, String> {
    expect_no_args("rainbow", args)?;
    Ok(spread_colors(&RAINBOW, text))
}

/// Prefixes evenly sized grapheme blocks with `[color]` tags and closes with
/// `[/fg]`. Brackets already in the text are escaped so they survive the
/// re-scan.
fn spread_colors<S: AsRef<str>>(colors: &[S], text: &str) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.is_empty() {
        return String::new();
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let blocksize =
        (((graphemes.len() as f64 / colors.len() as f64).round_ties_even()) as usize).max(1);

    let mut out = String::new();
    let mut block = 0;
    for (i, grapheme) in graphemes.iter().enumerate() {
        if i % blocksize == 0 && block < colors.len() {
            out.push('[');
            out.push_str(colors[block].as_ref());
            out.push(']');
            block += 1;
        }
        if *grapheme == "[" {
            out.push_str("\\[");
        } else {
            out.push_str(grapheme);
        }
    }

    out.push_str("[/fg]");
    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
