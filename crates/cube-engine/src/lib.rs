//! Rotating cube engine.
//!
//! Window runtime, GPU device handling and the cube renderer. The renderer
//! core in [`render`] only sees a [`render::RenderContext`], so it runs the
//! same against the wgpu backend and the headless recorder.

pub mod core;
pub mod device;
pub mod geometry;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
