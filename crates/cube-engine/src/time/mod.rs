//! Frame timing.
//!
//! One `FrameClock` per window, ticked once per redraw; `FrameRateMeter`
//! turns the ticks into a periodic frame rate for logging.

mod frame_clock;
mod frame_rate;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_rate::FrameRateMeter;
