//! Fit planning
//!
//! Computes the final pixel dimensions and the rasterization DPI that
//! produces them, from the terminal's character budget and the page's
//! aspect ratio. The aspect ratio comes from a cheap 72 DPI reference
//! render whose bitmap is discarded; computing the DPI analytically from
//! that probe avoids rendering at a guessed resolution and rescaling.
//!
//! Planning never fails. Degenerate inputs clamp to 1x1 targets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::caps::{TerminalFamily, TerminalProfile};

/// How a page is fitted into the terminal's usable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fill the available height; shrink if that would overflow the width.
    Height,
    /// Fill the available width unconditionally; the result may be taller
    /// than the screen and the caller scrolls or clips.
    Width,
    /// Fill the width, re-fitting to height when that overflows. Never
    /// exceeds either bound.
    #[default]
    Auto,
}

/// Columns kept clear so images never touch the terminal edges.
const HORIZONTAL_PADDING: u16 = 4;
/// Rows kept clear above and below the image.
const VERTICAL_PADDING: u16 = 3;

/// DPI of the aspect-ratio probe render.
pub const REFERENCE_DPI: f64 = 72.0;

const MIN_DPI: f64 = 36.0;
/// Ceiling for cell-addressed native graphics.
const MAX_DPI_NATIVE: f64 = 300.0;
/// Ceiling for pixel-streamed protocols, where encoding cost dominates;
/// 100 DPI stays readable at a fraction of the encode time.
const MAX_DPI_PIXEL_STREAM: f64 = 100.0;

/// Resolved render target for one page. Derived per page, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPlan {
    /// Final image width in pixels.
    pub width: u32,
    /// Final image height in pixels.
    pub height: u32,
    /// DPI at which the rasterizer reproduces those dimensions.
    pub dpi: f64,
}

/// Plan the render target for a page whose 72 DPI reference render
/// measured `ref_width` x `ref_height`.
///
/// `scale` is the user zoom factor; values <= 0 are treated as 1.0.
pub fn plan(
    profile: &TerminalProfile,
    mode: FitMode,
    ref_width: u32,
    ref_height: u32,
    scale: f64,
) -> FitPlan {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    let eff_cols = profile.cols.saturating_sub(HORIZONTAL_PADDING).max(1);
    let eff_rows = profile.rows.saturating_sub(VERTICAL_PADDING).max(1);
    let target_w = ((f64::from(eff_cols) * profile.cell_width * scale) as i64).max(1);
    let target_h = ((f64::from(eff_rows) * profile.cell_height * scale) as i64).max(1);

    let ref_width = ref_width.max(1);
    let ref_height = ref_height.max(1);
    let aspect = f64::from(ref_height) / f64::from(ref_width);

    let (final_w, final_h) = match mode {
        FitMode::Height => {
            let mut h = target_h;
            let mut w = (h as f64 / aspect) as i64;
            if w > target_w {
                w = target_w;
                h = (w as f64 * aspect) as i64;
            }
            (w, h)
        }
        FitMode::Width => {
            let w = target_w;
            (w, (w as f64 * aspect) as i64)
        }
        FitMode::Auto => {
            let mut w = target_w;
            let mut h = (w as f64 * aspect) as i64;
            if h > target_h {
                h = target_h;
                w = (h as f64 / aspect) as i64;
            }
            (w, h)
        }
    };
    let width = final_w.max(1) as u32;
    let height = final_h.max(1) as u32;

    // The tighter of the two per-axis DPIs; the looser one would overflow
    // the other axis.
    let dpi_for_width = f64::from(width) / f64::from(ref_width) * REFERENCE_DPI;
    let dpi_for_height = f64::from(height) / f64::from(ref_height) * REFERENCE_DPI;
    let dpi = dpi_for_width
        .min(dpi_for_height)
        .clamp(MIN_DPI, max_dpi(profile.family));

    debug!(width, height, dpi, ?mode, "planned page fit");
    FitPlan { width, height, dpi }
}

/// DPI ceiling per protocol family.
fn max_dpi(family: TerminalFamily) -> f64 {
    match family {
        TerminalFamily::Kitty => MAX_DPI_NATIVE,
        TerminalFamily::Sixel | TerminalFamily::Unknown => MAX_DPI_PIXEL_STREAM,
    }
}
