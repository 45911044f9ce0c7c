//! Luminance, perceived brightness and WCAG contrast.
//!
//! All inputs are sRGB component triples. Luminance follows the WCAG 2.x
//! definition (linearized channels weighted 0.2126/0.7152/0.0722),
//! brightness is CIE L* rescaled to `[0.0, 1.0]`.

/// Foreground candidates for [`contrast_foreground`]. Slightly off pure
/// black and white so the picked color still reads as a color when the
/// terminal theme remaps the extremes.
const NEAR_BLACK: (u8, u8, u8) = (12, 12, 12);
const NEAR_WHITE: (u8, u8, u8) = (242, 242, 242);

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance of an sRGB color, in `[0.0, 1.0]`.
#[must_use]
pub fn relative_luminance(rgb: (u8, u8, u8)) -> f64 {
    let (r, g, b) = rgb;
    0.0722f64.mul_add(
        linearize(b),
        0.2126f64.mul_add(linearize(r), 0.7152 * linearize(g)),
    )
}

/// Perceived brightness (CIE L*), rescaled to `[0.0, 1.0]`.
#[must_use]
pub fn brightness(rgb: (u8, u8, u8)) -> f64 {
    // CIE constants: epsilon = 216/24389, kappa = 24389/27.
    const EPSILON: f64 = 216.0 / 24389.0;
    const KAPPA: f64 = 24389.0 / 27.0;

    let luminance = relative_luminance(rgb);

    let lstar = if luminance <= EPSILON {
        luminance * KAPPA
    } else {
        116.0f64.mul_add(luminance.cbrt(), -16.0)
    };

    lstar / 100.0
}

/// WCAG contrast ratio between two colors, in `[1.0, 21.0]`.
///
/// Symmetric in its arguments; the lighter color goes on top.
#[must_use]
pub fn contrast_ratio(a: (u8, u8, u8), b: (u8, u8, u8)) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);

    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Pick a readable foreground for the given background.
///
/// Returns near-white on dark backgrounds and near-black on light ones,
/// whichever candidate yields the higher contrast ratio.
#[must_use]
pub fn contrast_foreground(background: (u8, u8, u8)) -> (u8, u8, u8) {
    if contrast_ratio(NEAR_WHITE, background) >= contrast_ratio(NEAR_BLACK, background) {
        NEAR_WHITE
    } else {
        NEAR_BLACK
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const BLACK: (u8, u8, u8) = (0, 0, 0);
    const WHITE: (u8, u8, u8) = (255, 255, 255);

    #[test]
    fn luminance_extremes() {
        assert!(relative_luminance(BLACK).abs() < 1e-9);
        assert!((relative_luminance(WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn green_dominates_luminance() {
        let g = relative_luminance((0, 255, 0));
        let r = relative_luminance((255, 0, 0));
        let b = relative_luminance((0, 0, 255));
        assert!(g > r && r > b);
    }

    #[test]
    fn brightness_extremes() {
        assert!(brightness(BLACK).abs() < 1e-9);
        assert!((brightness(WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn brightness_is_monotone_in_grey() {
        let mut last = -1.0;
        for v in [0u8, 32, 64, 96, 128, 160, 192, 224, 255] {
            let b = brightness((v, v, v));
            assert!(b > last, "brightness({v}) = {b} <= {last}");
            last = b;
        }
    }

    #[test]
    fn contrast_ratio_black_white_is_21() {
        assert!((contrast_ratio(BLACK, WHITE) - 21.0).abs() < 1e-9);
        assert!((contrast_ratio(WHITE, BLACK) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn contrast_ratio_of_identical_is_one() {
        assert!((contrast_ratio((93, 11, 170), (93, 11, 170)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dark_backgrounds_get_light_text() {
        assert_eq!(contrast_foreground(BLACK), (242, 242, 242));
        assert_eq!(contrast_foreground((20, 20, 60)), (242, 242, 242));
    }

    #[test]
    fn light_backgrounds_get_dark_text() {
        assert_eq!(contrast_foreground(WHITE), (12, 12, 12));
        assert_eq!(contrast_foreground((250, 250, 210)), (12, 12, 12));
    }

    #[test]
    fn saturated_red_reads_better_in_dark_text() {
        // Luminance of pure red is 0.2126, above the crossover point.
        assert_eq!(contrast_foreground((255, 0, 0)), (12, 12, 12));
    }
}
