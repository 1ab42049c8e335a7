//! Color model shared between configuration and renderers.
//!
//! Colors are straight-alpha and written to the framebuffer unconverted; the
//! GPU layer avoids sRGB surfaces by default so a `0.75` gray stays `0.75`.

pub mod color;

pub use color::Color;
