//! Time subsystem.
//!
//! Provides the monotonic clock that drives animation, decoupled from the
//! runtime so frames can be stepped deterministically in tests:
//! - one `FrameClock` per render loop
//! - call `tick()` once per presented frame to obtain `FrameTime`

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
