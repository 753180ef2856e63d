//! Orbit engine crate.
//!
//! A single-pipeline wgpu renderer that draws one triangle orbiting the
//! origin, plus the platform runtime that hosts it.

pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;
