//! Adaptive page rendering pipeline
//!
//! Three coordinate spaces meet here: document pixels, terminal pixels,
//! and terminal character cells. Every render reconciles them up front —
//! there is no feedback channel to correct dimensions after emission.
//!
//! ```text
//!   TerminalProfile ──► FitPlanner ──► PageRenderer ──► ColorTransform
//!        (caps)           (fit)          (page)            (color)
//!                                           │
//!                                           ▼
//!                                      Compositor ──► ProtocolEmitter
//!                                      (composite)     (emit: kitty/sixel)
//! ```
//!
//! Each navigation event runs the chain once, synchronously, with no
//! state carried between calls.

pub mod caps;
pub mod color;
pub mod composite;
pub mod emit;
pub mod fit;
pub mod kitty;
pub mod page;
pub mod sixel;
