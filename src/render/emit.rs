//! PNG staging and protocol emission
//!
//! The staging file exists for exactly one emission: create before use,
//! removed on every exit path via the guard's `Drop`. Emission itself
//! never surfaces an error — a failed terminal write degrades to 0 lines
//! used so the caller can substitute placeholder text.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::errors::{RenderError, Result};

use super::caps::{TerminalFamily, TerminalProfile};
use super::kitty;
use super::page::{Align, RenderedPage};
use super::sixel;

/// A PNG staged on disk for the duration of one emission. The encoded
/// bytes are kept in memory as well, so protocols that transmit inline
/// do not read the file back.
#[derive(Debug)]
pub struct StagedImage {
    path: PathBuf,
    png: Vec<u8>,
}

impl StagedImage {
    /// Encode `image` as PNG and write it to `<dir>/<name>`.
    pub fn write(dir: &Path, name: &str, image: &RgbaImage) -> Result<Self> {
        let path = dir.join(name);
        fs::create_dir_all(dir).map_err(|e| RenderError::Encode {
            path: path.clone(),
            source: ImageError::IoError(e),
        })?;

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|source| RenderError::Encode {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, &png).map_err(|e| RenderError::Encode {
            path: path.clone(),
            source: ImageError::IoError(e),
        })?;

        debug!(path = %path.display(), bytes = png.len(), "staged image");
        Ok(Self { path, png })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }
}

impl Drop for StagedImage {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Column offset that realizes `align` within `max_cols`. Never negative;
/// an image wider than the budget pins to column 0.
pub fn horizontal_offset(align: Align, max_cols: u16, char_width: u16) -> u16 {
    let spare = max_cols.saturating_sub(char_width);
    match align {
        Align::Left => 0,
        Align::Center => spare / 2,
        Align::Right => spare,
    }
}

/// Emit a rendered page to the terminal: cursor offset first, then the
/// protocol's native draw call. Cell-addressed protocols receive
/// character dimensions, pixel-streamed protocols pixel dimensions — the
/// two must never be conflated.
///
/// Returns the number of terminal lines consumed, or 0 on any failure.
pub fn emit<W: Write>(
    out: &mut W,
    page: &RenderedPage,
    profile: &TerminalProfile,
    offset_cols: u16,
    staged: &StagedImage,
) -> usize {
    match try_emit(out, page, profile, offset_cols, staged) {
        Ok(lines) => lines,
        Err(err) => {
            warn!(error = %err, "image emission failed");
            0
        }
    }
}

fn try_emit<W: Write>(
    out: &mut W,
    page: &RenderedPage,
    profile: &TerminalProfile,
    offset_cols: u16,
    staged: &StagedImage,
) -> Result<usize> {
    if offset_cols > 0 {
        write!(out, "\x1b[{offset_cols}C").map_err(RenderError::Emit)?;
    }

    match profile.family {
        TerminalFamily::Kitty => {
            let seq = kitty::transmit_sequence(staged.png_bytes(), page.char_width, page.char_lines);
            out.write_all(seq.as_bytes()).map_err(RenderError::Emit)?;
        }
        TerminalFamily::Sixel => {
            let seq = sixel::encode(&page.image);
            out.write_all(seq.as_bytes()).map_err(RenderError::Emit)?;
        }
        TerminalFamily::Unknown => {
            debug!("no graphics protocol available, skipping image");
            return Ok(0);
        }
    }
    out.flush().map_err(RenderError::Emit)?;
    Ok(usize::from(page.char_lines))
}
