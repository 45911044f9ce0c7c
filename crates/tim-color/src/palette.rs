// SPDX-License-Identifier: MIT
//
// The xterm palette: tables and conversion math.
//
// Three families live in the 256-color palette:
//
//   0-15    the standard colors (implementation-defined; we use the
//           common xterm defaults)
//   16-231  a 6x6x6 RGB cube with channel values 0, 95, 135, 175, 215, 255
//   232-255 a 24-step greyscale ramp from 8 to 238
//
// Downward conversion is deterministic: RGB quantizes into the cube by
// per-channel rounding, and the 16-color match minimizes a redmean-
// weighted distance, which tracks perceived difference much better than
// plain Euclidean distance on sRGB components.

/// RGB values of the standard 16 ANSI colors (xterm defaults).
pub const ANSI16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // 0: black
    (128, 0, 0),     // 1: red
    (0, 128, 0),     // 2: green
    (128, 128, 0),   // 3: yellow
    (0, 0, 128),     // 4: blue
    (128, 0, 128),   // 5: magenta
    (0, 128, 128),   // 6: cyan
    (192, 192, 192), // 7: white
    (128, 128, 128), // 8: bright black
    (255, 0, 0),     // 9: bright red
    (0, 255, 0),     // 10: bright green
    (255, 255, 0),   // 11: bright yellow
    (0, 0, 255),     // 12: bright blue
    (255, 0, 255),   // 13: bright magenta
    (0, 255, 255),   // 14: bright cyan
    (255, 255, 255), // 15: bright white
];

/// One channel of the 6x6x6 cube: step 0 is 0, steps 1-5 are 95..255.
const fn cube_channel(step: u8) -> u8 {
    if step == 0 { 0 } else { 55 + 40 * step }
}

/// Convert an xterm-256 palette index to its RGB values.
#[must_use]
pub const fn ansi256_to_rgb(idx: u8) -> (u8, u8, u8) {
    match idx {
        0..=15 => ANSI16_RGB[idx as usize],

        16..=231 => {
            let idx = idx - 16;
            (
                cube_channel(idx / 36),
                cube_channel((idx % 36) / 6),
                cube_channel(idx % 6),
            )
        }

        232..=255 => {
            let v = 8 + 10 * (idx - 232);
            (v, v, v)
        }
    }
}

/// Quantize an RGB color into the 6x6x6 cube (indices 16-231).
///
/// Each channel rounds to its nearest of six steps. Greys land on the
/// nearest cube grey rather than the dedicated ramp; use
/// [`greyscale_index`] when ramp precision matters.
#[must_use]
pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // result is 0..=5
    fn quant(channel: u8) -> u8 {
        (f64::from(channel) / 51.0).round() as u8
    }

    16 + 36 * quant(r) + 6 * quant(g) + quant(b)
}

/// Find the closest of the 16 standard colors, as an index 0-15.
///
/// Uses redmean-weighted distance; ties break toward the lower index,
/// so the result is stable across runs.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // the palette has 16 entries
pub fn rgb_to_ansi16(r: u8, g: u8, b: u8) -> u8 {
    let mut best = 0u8;
    let mut best_dist = f64::MAX;

    for (idx, &candidate) in ANSI16_RGB.iter().enumerate() {
        let dist = color_difference((r, g, b), candidate);
        if dist < best_dist {
            best_dist = dist;
            best = idx as u8;
        }
    }

    best
}

/// Map a perceived brightness in `[0.0, 1.0]` onto the greyscale ramp
/// (indices 232-255).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=23
pub fn greyscale_index(brightness: f64) -> u8 {
    232 + (brightness * 23.0).clamp(0.0, 23.0) as u8
}

/// Redmean difference between two RGB colors.
///
/// A cheap approximation of perceptual distance that weights the red
/// and blue deltas by where the pair sits on the red axis.
#[must_use]
pub fn color_difference(a: (u8, u8, u8), b: (u8, u8, u8)) -> f64 {
    let redmean = f64::from((u16::from(a.0) + u16::from(b.0)) / 2);

    let delta_r = f64::from(a.0) - f64::from(b.0);
    let delta_g = f64::from(a.1) - f64::from(b.1);
    let delta_b = f64::from(a.2) - f64::from(b.2);

    let weighted = (2.0 + redmean / 256.0).mul_add(
        delta_r * delta_r,
        (2.0 + (255.0 - redmean) / 256.0).mul_add(delta_b * delta_b, 4.0 * (delta_g * delta_g)),
    );

    weighted.sqrt()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
