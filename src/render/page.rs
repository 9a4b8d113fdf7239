//! Page rendering pipeline
//!
//! Drives the external rasterizer at the planned DPI, applies the color
//! transform, and converts pixel extents back to character cells for
//! layout. The two-pass protocol (72 DPI probe for aspect, then the real
//! render) is deliberate: final pixel dimensions cannot be known before
//! the aspect ratio is.

use std::io::Write;
use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{RenderError, Result};

use super::caps::TerminalProfile;
use super::color::{self, DarkMode};
use super::composite::{self, CompositeLayout, Orientation};
use super::emit::{self, StagedImage};
use super::fit::{self, FitMode, REFERENCE_DPI};

/// External document engine seam. Implementors rasterize one page of the
/// open document to RGBA at the requested DPI; pixel dimensions must be
/// consistent with DPI times the page size in inches.
pub trait PageRasterizer {
    fn rasterize(
        &self,
        page: usize,
        dpi: f64,
    ) -> std::result::Result<RgbaImage, Box<dyn std::error::Error + Send + Sync>>;
}

/// Horizontal placement of the image within the column budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Per-call render configuration. Passed explicitly into every planning
/// and render call; nothing here is ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub fit_mode: FitMode,
    pub dark_mode: DarkMode,
    /// User zoom; values <= 0 are treated as 1.0.
    pub scale_factor: f64,
    pub align: Align,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fit_mode: FitMode::Auto,
            dark_mode: DarkMode::None,
            scale_factor: 1.0,
            align: Align::Center,
        }
    }
}

/// One fully rendered page, ready for compositing or emission. Owned by
/// the caller that requested it.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub image: RgbaImage,
    pub px_width: u32,
    pub px_height: u32,
    /// Width in character cells, rounded up so layout never under-reserves.
    pub char_width: u16,
    /// Height in terminal lines, clamped to the profile's row budget;
    /// anything taller clips silently rather than corrupting layout.
    pub char_lines: u16,
}

impl RenderedPage {
    pub(crate) fn from_image(image: RgbaImage, profile: &TerminalProfile) -> Self {
        let px_width = image.width();
        let px_height = image.height();
        let char_width = cells_for(px_width, profile.cell_width);
        let char_lines = cells_for(px_height, profile.cell_height).min(profile.rows);
        Self {
            image,
            px_width,
            px_height,
            char_width,
            char_lines,
        }
    }
}

/// Integer division plus one, biased to never under-report cell coverage.
/// Under-reporting causes layout overlap.
fn cells_for(pixels: u32, cell: f64) -> u16 {
    let cell = if cell > 0.0 { cell } else { 1.0 };
    let cells = (f64::from(pixels) / cell) as u32 + 1;
    u16::try_from(cells).unwrap_or(u16::MAX)
}

/// Render one page at its planned fit. Fails only if the rasterizer fails.
pub fn render_page<R: PageRasterizer + ?Sized>(
    rasterizer: &R,
    profile: &TerminalProfile,
    opts: &RenderOptions,
    page: usize,
) -> Result<RenderedPage> {
    // Cheap reference render, read only for its aspect ratio.
    let reference = rasterizer
        .rasterize(page, REFERENCE_DPI)
        .map_err(|source| RenderError::Rasterize { page, source })?;
    let plan = fit::plan(
        profile,
        opts.fit_mode,
        reference.width(),
        reference.height(),
        opts.scale_factor,
    );
    drop(reference);

    let image = rasterizer
        .rasterize(page, plan.dpi)
        .map_err(|source| RenderError::Rasterize { page, source })?;
    let image = color::apply(&image, opts.dark_mode);
    debug!(
        page,
        dpi = plan.dpi,
        width = image.width(),
        height = image.height(),
        "rendered page"
    );
    Ok(RenderedPage::from_image(image, profile))
}

/// Render and emit a single page: plan, rasterize, transform, stage the
/// PNG, draw. Returns the number of terminal lines used; 0 means the
/// emitter degraded and the caller should show a placeholder.
pub fn display_page<W, R>(
    out: &mut W,
    rasterizer: &R,
    profile: &TerminalProfile,
    opts: &RenderOptions,
    page: usize,
    stage_dir: &Path,
) -> Result<usize>
where
    W: Write,
    R: PageRasterizer + ?Sized,
{
    let rendered = render_page(rasterizer, profile, opts, page)?;
    let staged = StagedImage::write(stage_dir, &format!("page_{page}.png"), &rendered.image)?;
    let offset = emit::horizontal_offset(opts.align, profile.cols, rendered.char_width);
    Ok(emit::emit(out, &rendered, profile, offset, &staged))
}

/// Render two pages into one composite and emit it centered. Each page
/// gets an independent slice of the character grid; the second page is
/// optional (last page of an odd-length document).
#[allow(clippy::too_many_arguments)]
pub fn display_dual<W, R>(
    out: &mut W,
    rasterizer: &R,
    profile: &TerminalProfile,
    opts: &RenderOptions,
    pages: (usize, Option<usize>),
    orientation: Orientation,
    gap: u32,
    stage_dir: &Path,
) -> Result<usize>
where
    W: Write,
    R: PageRasterizer + ?Sized,
{
    let (budget_a, budget_b) = composite::split_budget(orientation, profile.cols, profile.rows);

    let first = render_page(
        rasterizer,
        &profile.with_grid(budget_a.0, budget_a.1),
        opts,
        pages.0,
    )?;
    let second = match pages.1 {
        Some(p) => Some(render_page(
            rasterizer,
            &profile.with_grid(budget_b.0, budget_b.1),
            opts,
            p,
        )?),
        None => None,
    };

    let layout = CompositeLayout::for_mode(orientation, gap, opts.dark_mode.is_dark());
    let composed = composite::compose(profile, &first, second.as_ref(), &layout);

    let staged = StagedImage::write(stage_dir, "dual.png", &composed.image)?;
    let offset = emit::horizontal_offset(Align::Center, profile.cols, composed.char_width);
    Ok(emit::emit(out, &composed, profile, offset, &staged))
}
