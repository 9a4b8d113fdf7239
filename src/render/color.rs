//! Dark-mode color transforms
//!
//! Both inversions are pure, stateless and per-pixel; alpha always passes
//! through unchanged. Neither is a true involution: the gray-floor bias
//! means applying one twice does not reproduce the original.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Dark-mode treatment applied to a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkMode {
    /// Leave page colors untouched.
    #[default]
    None,
    /// Invert lightness only; hue and saturation survive, so a red
    /// highlight stays perceptibly red on the flipped background.
    Smart,
    /// Full channel inversion remapped into a 30-255 range.
    Invert,
}

impl DarkMode {
    /// Whether this mode wants dark composite backgrounds.
    pub fn is_dark(self) -> bool {
        !matches!(self, DarkMode::None)
    }
}

/// Lightness floor for smart inversion: bright backgrounds land on dark
/// gray rather than pure black.
const SMART_LIGHTNESS_FLOOR: f64 = 0.12;

/// Channel floor for simple inversion (white maps here). Near but
/// deliberately not equal to `SMART_LIGHTNESS_FLOOR` * 255; the two floors
/// are independent constants.
const INVERT_CHANNEL_FLOOR: u32 = 30;

/// Apply a dark-mode transform to a full bitmap. Output dimensions always
/// match the input.
pub fn apply(img: &RgbaImage, mode: DarkMode) -> RgbaImage {
    match mode {
        DarkMode::None => img.clone(),
        DarkMode::Smart => smart_invert(img),
        DarkMode::Invert => simple_invert(img),
    }
}

/// Invert lightness in HSL space, leaving hue and saturation alone.
fn smart_invert(src: &RgbaImage) -> RgbaImage {
    let mut dst = RgbaImage::new(src.width(), src.height());
    for (out, px) in dst.pixels_mut().zip(src.pixels()) {
        let Rgba([r, g, b, a]) = *px;
        let (h, s, l) = rgb_to_hsl(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        );
        let l = SMART_LIGHTNESS_FLOOR + (1.0 - l) * (1.0 - SMART_LIGHTNESS_FLOOR);
        let (nr, ng, nb) = hsl_to_rgb(h, s, l);
        *out = Rgba([
            (nr * 255.0) as u8,
            (ng * 255.0) as u8,
            (nb * 255.0) as u8,
            a,
        ]);
    }
    dst
}

/// Full RGB inversion remapped so 255 -> 30 and 0 -> 255.
fn simple_invert(src: &RgbaImage) -> RgbaImage {
    let mut dst = RgbaImage::new(src.width(), src.height());
    for (out, px) in dst.pixels_mut().zip(src.pixels()) {
        let Rgba([r, g, b, a]) = *px;
        *out = Rgba([invert_channel(r), invert_channel(g), invert_channel(b), a]);
    }
    dst
}

fn invert_channel(c: u8) -> u8 {
    (INVERT_CHANNEL_FLOOR + (255 - u32::from(c)) * 225 / 255) as u8
}

fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let mut h = if (max - r).abs() < f64::EPSILON {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    h /= 6.0;
    (h, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}
