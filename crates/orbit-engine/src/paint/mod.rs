//! Color model shared by frame state and the renderer.

mod color;

pub use color::Color;
