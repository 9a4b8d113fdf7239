//! End-to-end pipeline tests with a synthetic document backend.
//!
//! These exercise the full chain per navigation event: plan fit,
//! rasterize, color-transform, composite, stage and emit.

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use termpage::{
    display_dual, display_page, render_page, DarkMode, FitMode, Orientation, PageRasterizer,
    RenderError, RenderOptions, TerminalFamily, TerminalProfile,
};

/// A4-proportioned synthetic document. Page 0 is white, page 1 light
/// gray, so composites are distinguishable; any other page index fails.
struct SyntheticDoc {
    pages: usize,
}

impl PageRasterizer for SyntheticDoc {
    fn rasterize(
        &self,
        page: usize,
        dpi: f64,
    ) -> Result<RgbaImage, Box<dyn std::error::Error + Send + Sync>> {
        if page >= self.pages {
            return Err(format!("page {page} out of range").into());
        }
        let w = (595.0 * dpi / 72.0).round() as u32;
        let h = (842.0 * dpi / 72.0).round() as u32;
        let shade = if page == 0 { 255 } else { 200 };
        Ok(RgbaImage::from_pixel(w, h, Rgba([shade, shade, shade, 255])))
    }
}

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn kitty_profile() -> TerminalProfile {
    TerminalProfile {
        family: TerminalFamily::Kitty,
        cell_width: 18.0,
        cell_height: 36.0,
        cols: 80,
        rows: 40,
        term_name: "kitty".to_string(),
    }
}

fn sixel_profile() -> TerminalProfile {
    TerminalProfile {
        family: TerminalFamily::Sixel,
        cell_width: 15.0,
        cell_height: 25.0,
        cols: 80,
        rows: 40,
        term_name: "foot".to_string(),
    }
}

// ==================== Single page ====================

#[test]
fn test_display_page_kitty() {
    init_tracing();
    let doc = SyntheticDoc { pages: 2 };
    let dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    let lines = display_page(
        &mut out,
        &doc,
        &kitty_profile(),
        &RenderOptions::default(),
        0,
        dir.path(),
    )
    .unwrap();

    let text = String::from_utf8_lossy(&out);
    assert!(lines > 0 && lines <= 40);
    // centered image starts with a cursor offset, then the APC stream
    assert!(text.contains("\x1b_G"));
    assert!(text.contains("a=T,f=100"));
}

#[test]
fn test_display_page_sixel() {
    let doc = SyntheticDoc { pages: 2 };
    let dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    let lines = display_page(
        &mut out,
        &doc,
        &sixel_profile(),
        &RenderOptions::default(),
        0,
        dir.path(),
    )
    .unwrap();

    let text = String::from_utf8_lossy(&out);
    assert!(lines > 0);
    assert!(text.contains("\x1bP0;1;0q"));
    assert!(text.ends_with("\x1b\\"));
    // pixel-streamed output carries pixel dimensions in raster attributes
    assert!(text.contains("\"1;1;"));
}

#[test]
fn test_staging_file_removed_after_display() {
    let doc = SyntheticDoc { pages: 1 };
    let dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    display_page(
        &mut out,
        &doc,
        &kitty_profile(),
        &RenderOptions::default(),
        0,
        dir.path(),
    )
    .unwrap();

    assert!(!dir.path().join("page_0.png").exists());
}

#[test]
fn test_rasterizer_failure_propagates() {
    let doc = SyntheticDoc { pages: 1 };
    let dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    let err = display_page(
        &mut out,
        &doc,
        &kitty_profile(),
        &RenderOptions::default(),
        9,
        dir.path(),
    )
    .unwrap_err();

    match err {
        RenderError::Rasterize { page, .. } => assert_eq!(page, 9),
        other => panic!("unexpected error: {other}"),
    }
    // nothing was written before the failure surfaced
    assert!(out.is_empty());
}

#[test]
fn test_dark_mode_changes_payload() {
    let doc = SyntheticDoc { pages: 1 };
    let dir = TempDir::new().unwrap();

    let mut plain = Vec::new();
    let mut dark = Vec::new();
    display_page(
        &mut plain,
        &doc,
        &kitty_profile(),
        &RenderOptions::default(),
        0,
        dir.path(),
    )
    .unwrap();
    display_page(
        &mut dark,
        &doc,
        &kitty_profile(),
        &RenderOptions {
            dark_mode: DarkMode::Invert,
            ..RenderOptions::default()
        },
        0,
        dir.path(),
    )
    .unwrap();

    assert_ne!(plain, dark);
}

// ==================== Dual page ====================

#[test]
fn test_display_dual_stacked() {
    init_tracing();
    let doc = SyntheticDoc { pages: 2 };
    let dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    let lines = display_dual(
        &mut out,
        &doc,
        &kitty_profile(),
        &RenderOptions::default(),
        (0, Some(1)),
        Orientation::Stacked,
        10,
        dir.path(),
    )
    .unwrap();

    assert!(lines > 0 && lines <= 40);
    assert!(!dir.path().join("dual.png").exists());
}

#[test]
fn test_display_dual_side_by_side_single_page() {
    // odd page count: second slot empty, still renders and emits
    let doc = SyntheticDoc { pages: 1 };
    let dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    let lines = display_dual(
        &mut out,
        &doc,
        &sixel_profile(),
        &RenderOptions::default(),
        (0, None),
        Orientation::SideBySide,
        8,
        dir.path(),
    )
    .unwrap();

    assert!(lines > 0);
    assert!(String::from_utf8_lossy(&out).starts_with("\x1bP") || out[0] == 0x1b);
}

// ==================== Fit interaction ====================

#[test]
fn test_rendered_page_respects_row_budget_across_modes() {
    let doc = SyntheticDoc { pages: 1 };
    let profile = kitty_profile();
    for fit_mode in [FitMode::Auto, FitMode::Height, FitMode::Width] {
        let opts = RenderOptions {
            fit_mode,
            ..RenderOptions::default()
        };
        let rendered = render_page(&doc, &profile, &opts, 0).unwrap();
        assert!(
            rendered.char_lines <= profile.rows,
            "{fit_mode:?} over-reported lines"
        );
    }
}

#[test]
fn test_zoom_out_shrinks_render() {
    let doc = SyntheticDoc { pages: 1 };
    let profile = kitty_profile();
    let full = render_page(&doc, &profile, &RenderOptions::default(), 0).unwrap();
    let half = render_page(
        &doc,
        &profile,
        &RenderOptions {
            scale_factor: 0.5,
            ..RenderOptions::default()
        },
        0,
    )
    .unwrap();
    assert!(half.px_width < full.px_width);
    assert!(half.px_height < full.px_height);
}
