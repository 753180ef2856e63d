//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and drives the renderer: resize
//! signals are forwarded between frames and each `RedrawRequested` is one tick.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
