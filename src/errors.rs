use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering a page to the terminal.
///
/// Only the boundaries fail: the external rasterizer, the PNG staging
/// file, and the terminal write. Geometry planning, color transforms and
/// compositing always resolve to a defined output.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The external document engine could not produce a bitmap for a page.
    #[error("failed to rasterize page {page}: {source}")]
    Rasterize {
        page: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A rendered bitmap could not be serialized to its staging file.
    #[error("failed to stage image at {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The terminal write failed, e.g. a broken pipe mid-emission.
    #[error("failed to emit image to terminal: {0}")]
    Emit(#[from] std::io::Error),
}

/// Type alias for Result with RenderError
pub type Result<T> = std::result::Result<T, RenderError>;
