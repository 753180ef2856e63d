//! GPU rendering subsystem.
//!
//! The renderer owns the single pipeline, its buffers and bind group, and
//! records one pass per frame through a `GpuBackend`.
//!
//! Convention:
//! - vertex positions are clip-space (`-1..1`, +Y up)
//! - the vertex shader adds the offset uniform (group 0, binding 0)

mod renderer;
mod shader;

pub use renderer::{FrameOutcome, Renderer, RendererConfig, Status};
pub use shader::{FRAGMENT_ENTRY, TRIANGLE_SHADER, VERTEX_ENTRY, validate_shader};
