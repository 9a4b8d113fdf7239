//! # termpage
//!
//! Adaptive terminal image rendering for document viewers. Given a source
//! raster page (from an external document engine) and the live terminal's
//! character grid and pixel geometry, termpage computes the render
//! resolution, fit, and color treatment that display correctly across
//! incompatible terminal graphics protocols, then emits the result via
//! Kitty graphics (cell-addressed) or Sixel (pixel-streamed).
//!
//! The document engine is a collaborator, not a dependency: implement
//! [`PageRasterizer`] over whatever PDF/EPUB backend opens the file, and
//! call [`display_page`] or [`display_dual`] per navigation event.

pub mod errors;
pub mod render;

pub use errors::{RenderError, Result};
pub use render::caps::{TerminalFamily, TerminalProfile};
pub use render::color::DarkMode;
pub use render::composite::{CompositeLayout, Orientation};
pub use render::fit::{FitMode, FitPlan};
pub use render::page::{
    display_dual, display_page, render_page, Align, PageRasterizer, RenderOptions, RenderedPage,
};
