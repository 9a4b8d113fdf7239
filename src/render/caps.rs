//! Terminal geometry detection
//!
//! Resolution order:
//! 1. TIOCGWINSZ ioctl — reports both character and pixel extents of the
//!    window, which yields exact pixel-per-cell metrics.
//! 2. Environment classification (`TERM_PROGRAM`, kitty env vars, `TERM`
//!    substrings) against a fixed per-family metrics table.
//!
//! Detection never fails; the worst case is an 80x24 grid at 15x30 px
//! cells with no graphics protocol.

use std::env;

use tracing::debug;

/// Cell widths at or below this are treated as a bogus ioctl reply.
const MIN_CELL_WIDTH: f64 = 4.0;
/// Cell heights at or below this are treated as a bogus ioctl reply.
const MIN_CELL_HEIGHT: f64 = 8.0;

/// Per-terminal pixel-per-cell fallbacks, used when the terminal does not
/// report pixel extents. Tuned against each terminal's default font setup.
const CELL_METRICS: &[(&str, f64, f64)] = &[
    ("kitty", 18.0, 36.0),
    ("wezterm", 18.0, 36.0),
    ("ghostty", 18.0, 36.0),
    ("iterm2", 16.0, 32.0),
    ("foot", 15.0, 25.0),
    ("alacritty", 14.0, 28.0),
    ("xterm", 7.0, 14.0),
];

/// Ultimate cell-size fallback for unrecognized terminals.
const DEFAULT_CELL: (f64, f64) = (15.0, 30.0);

/// Graphics protocol family, classified from environment signals.
///
/// The two families take fundamentally different size units: Kitty-style
/// protocols are addressed in character cells, Sixel-style protocols in
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalFamily {
    /// Kitty graphics protocol (kitty, WezTerm, Ghostty). Cell-addressed.
    Kitty,
    /// Pixel-streamed DECSIXEL terminals (foot, xterm, ...).
    Sixel,
    /// No recognizable graphics support.
    #[default]
    Unknown,
}

/// Geometry of the terminal a render targets.
///
/// Rebuilt from live probes on every render call; never cached across
/// invocations, so font or window changes take effect on the next page.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalProfile {
    /// Graphics protocol family.
    pub family: TerminalFamily,
    /// Pixels per character cell, horizontally.
    pub cell_width: f64,
    /// Pixels per character cell, vertically.
    pub cell_height: f64,
    /// Character columns available.
    pub cols: u16,
    /// Character rows available.
    pub rows: u16,
    /// Classified terminal name, for logging.
    pub term_name: String,
}

impl Default for TerminalProfile {
    fn default() -> Self {
        Self {
            family: TerminalFamily::Unknown,
            cell_width: DEFAULT_CELL.0,
            cell_height: DEFAULT_CELL.1,
            cols: 80,
            rows: 24,
            term_name: "unknown".to_string(),
        }
    }
}

impl TerminalProfile {
    /// Probe the live terminal. Infallible: implausible or missing probe
    /// results fall back to the per-family metrics table.
    pub fn detect() -> Self {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        let name = classify_terminal();
        let (cell_width, cell_height) = derive_cell_metrics(pixel_size(), cols, rows, name);
        let profile = Self {
            family: family_for(name),
            cell_width,
            cell_height,
            cols,
            rows,
            term_name: name.to_string(),
        };
        debug!(
            term = name,
            cols,
            rows,
            cell_width,
            cell_height,
            family = ?profile.family,
            "detected terminal geometry"
        );
        profile
    }

    /// Same terminal metrics with a different character budget. Dual-page
    /// layouts hand each page a slice of the grid this way.
    pub fn with_grid(&self, cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            ..self.clone()
        }
    }
}

/// Classify the terminal from environment signals. Order matters:
/// `TERM_PROGRAM` is the most specific, kitty's own env vars next, then a
/// substring match on `TERM`.
fn classify_terminal() -> &'static str {
    if let Ok(prog) = env::var("TERM_PROGRAM") {
        match prog.as_str() {
            "WezTerm" => return "wezterm",
            "iTerm.app" => return "iterm2",
            "Apple_Terminal" => return "apple_terminal",
            "Ghostty" => return "ghostty",
            _ => {}
        }
    }
    if env::var("KITTY_WINDOW_ID").is_ok() || env::var("KITTY_PID").is_ok() {
        return "kitty";
    }
    let term = env::var("TERM").unwrap_or_default();
    for name in ["kitty", "foot", "alacritty", "wezterm", "xterm", "tmux", "screen"] {
        if term.contains(name) {
            return name;
        }
    }
    "unknown"
}

/// Protocol family for a classified terminal name.
fn family_for(name: &str) -> TerminalFamily {
    match name {
        "kitty" | "wezterm" | "ghostty" => TerminalFamily::Kitty,
        "unknown" => TerminalFamily::Unknown,
        _ => TerminalFamily::Sixel,
    }
}

/// Cell metrics from the pixel probe, gated for plausibility, with the
/// per-family table as fallback.
fn derive_cell_metrics(
    pixel: Option<(u32, u32)>,
    cols: u16,
    rows: u16,
    name: &str,
) -> (f64, f64) {
    if let Some((px, py)) = pixel {
        if cols > 0 && rows > 0 {
            let cell_width = f64::from(px) / f64::from(cols);
            let cell_height = f64::from(py) / f64::from(rows);
            if cell_width > MIN_CELL_WIDTH && cell_height > MIN_CELL_HEIGHT {
                return (cell_width, cell_height);
            }
        }
    }
    fallback_cell_metrics(name)
}

/// Table lookup for a classified terminal name.
fn fallback_cell_metrics(name: &str) -> (f64, f64) {
    CELL_METRICS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map_or(DEFAULT_CELL, |(_, w, h)| (*w, *h))
}

/// Window pixel extents via TIOCGWINSZ. Returns None when the terminal
/// does not fill in the pixel fields.
#[cfg(unix)]
fn pixel_size() -> Option<(u32, u32)> {
    let mut ws = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    // Safety: TIOCGWINSZ only writes into the winsize struct.
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    if rc == 0 && ws.ws_xpixel > 0 && ws.ws_ypixel > 0 {
        Some((u32::from(ws.ws_xpixel), u32::from(ws.ws_ypixel)))
    } else {
        None
    }
}

#[cfg(not(unix))]
fn pixel_size() -> Option<(u32, u32)> {
    None
}
