//! GPU device + surface management.
//!
//! This module is responsible for:
//! - the `GpuBackend` seam the renderer records against
//! - the wgpu implementation (`Gpu`): Instance/Adapter/Device/Queue + Surface
//! - surface sizing and presentability (`SurfaceManager`)

mod backend;
mod error;
mod gpu;
mod init;
mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{DrawPass, GpuBackend, PipelineDesc};
pub use error::{InitError, SurfaceErrorAction};
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::{Acquire, SurfaceManager};
