//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer.
//! One window, redrawn continuously; one `App::on_frame` call per redraw.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
