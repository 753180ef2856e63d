//! Frame state: the fixed triangle and the time-driven uniform.
//!
//! Nothing here touches the GPU. The renderer uploads what this module
//! computes.

mod frame_state;

pub use frame_state::{FrameState, ORBIT_RADIUS, TRIANGLE, UniformOffset, Vertex};
