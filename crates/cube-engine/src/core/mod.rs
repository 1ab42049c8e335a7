//! Contracts between the window runtime and the application.
//!
//! The runtime owns the event loop and per-window GPU state; the application
//! sees one [`FrameCtx`] per redraw and decides whether to keep going.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
