//! Dual-page composition
//!
//! Merges two independently rendered pages into one bitmap so the emitter
//! only ever handles a single image. The canvas is pre-filled with the
//! background before either page is copied in; when the pages differ in
//! size, the uncovered regions would otherwise be transparent. Copies are
//! opaque-over — both layers are fully opaque rasterized pages.

use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::caps::TerminalProfile;
use super::page::RenderedPage;

/// Arrangement of the two pages on the shared canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// One page above the other, each centered horizontally.
    Stacked,
    /// Pages next to each other, each centered vertically.
    SideBySide,
}

const LIGHT_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const DARK_BACKGROUND: Rgba<u8> = Rgba([30, 30, 30, 255]);

/// Transient layout description for one composite; discarded after the
/// bitmap is encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeLayout {
    pub orientation: Orientation,
    /// Pixel gap between the two pages.
    pub gap: u32,
    /// Canvas fill; covers regions neither page reaches.
    pub background: Rgba<u8>,
}

impl CompositeLayout {
    /// Layout with the background matched to the color treatment: white
    /// in normal mode, fixed dark gray in any dark mode.
    pub fn for_mode(orientation: Orientation, gap: u32, dark: bool) -> Self {
        Self {
            orientation,
            gap,
            background: if dark { DARK_BACKGROUND } else { LIGHT_BACKGROUND },
        }
    }
}

/// Split a character budget between the two pages of a dual layout:
/// stacked pages each get half the rows, side-by-side pages split the
/// columns.
pub fn split_budget(orientation: Orientation, cols: u16, rows: u16) -> ((u16, u16), (u16, u16)) {
    match orientation {
        Orientation::Stacked => {
            let half = rows / 2;
            ((cols, half), (cols, half))
        }
        Orientation::SideBySide => {
            let half = cols / 2;
            ((half, rows), (cols - half, rows))
        }
    }
}

/// Merge `first` and (optionally) `second` onto one canvas. Infallible;
/// the result's character dimensions are derived from `profile`.
pub fn compose(
    profile: &TerminalProfile,
    first: &RenderedPage,
    second: Option<&RenderedPage>,
    layout: &CompositeLayout,
) -> RenderedPage {
    let (a_w, a_h) = (first.px_width, first.px_height);

    let (canvas_w, canvas_h) = match layout.orientation {
        Orientation::Stacked => {
            let mut w = a_w;
            let mut h = a_h + layout.gap;
            if let Some(b) = second {
                w = w.max(b.px_width);
                h += b.px_height;
            }
            (w.max(1), h.max(1))
        }
        Orientation::SideBySide => {
            let mut w = a_w + layout.gap;
            let mut h = a_h;
            if let Some(b) = second {
                h = h.max(b.px_height);
                w += b.px_width;
            }
            (w.max(1), h.max(1))
        }
    };

    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, layout.background);

    match layout.orientation {
        Orientation::Stacked => {
            let x1 = i64::from((canvas_w - a_w) / 2);
            imageops::replace(&mut canvas, &first.image, x1, 0);
            if let Some(b) = second {
                let x2 = i64::from((canvas_w - b.px_width) / 2);
                imageops::replace(&mut canvas, &b.image, x2, i64::from(a_h + layout.gap));
            }
        }
        Orientation::SideBySide => {
            let y1 = i64::from((canvas_h - a_h) / 2);
            imageops::replace(&mut canvas, &first.image, 0, y1);
            if let Some(b) = second {
                let y2 = i64::from((canvas_h - b.px_height) / 2);
                imageops::replace(&mut canvas, &b.image, i64::from(a_w + layout.gap), y2);
            }
        }
    }

    RenderedPage::from_image(canvas, profile)
}
