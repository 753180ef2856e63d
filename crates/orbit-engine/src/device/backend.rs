use std::ops::Range;

use winit::dpi::PhysicalSize;

use crate::paint::Color;

use super::{InitError, SurfaceErrorAction};

/// Device operations the renderer and surface manager depend on.
///
/// `Gpu` implements this over wgpu. Handles are associated types so a
/// backend decides how resources are represented; descriptors reuse the
/// plain-data wgpu types (layouts, formats, usages).
pub trait GpuBackend: Sized {
    type Shader;
    type Buffer;
    type BindGroupLayout;
    type BindGroup;
    type Pipeline;
    /// One acquired surface image. Presenting consumes it.
    type Target;

    /// Formats the surface can be configured with on this device.
    fn surface_formats(&self) -> Vec<wgpu::TextureFormat>;

    /// Whether the host asked for an sRGB surface format.
    fn prefers_srgb(&self) -> bool;

    /// Device alignment for uniform buffer bindings, in bytes.
    fn min_uniform_buffer_offset_alignment(&self) -> u32;

    /// (Re)configures the surface backing store. `size` is never zero.
    fn configure_surface(&mut self, format: wgpu::TextureFormat, size: PhysicalSize<u32>);

    /// Creates a shader module from already validated WGSL.
    ///
    /// Errors the device still reports at creation are `ShaderCompile`.
    fn create_shader(&mut self, label: &str, wgsl: &str) -> Result<Self::Shader, InitError>;

    /// Creates a buffer initialized with `contents`.
    fn create_buffer_init(
        &mut self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Self::Buffer;

    /// Creates a zeroed buffer of `size` bytes.
    fn create_buffer(&mut self, label: &str, size: u64, usage: wgpu::BufferUsages) -> Self::Buffer;

    fn create_bind_group_layout(
        &mut self,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> Self::BindGroupLayout;

    /// Binds `uniform` in full to binding 0 of `layout`.
    fn create_uniform_bind_group(
        &mut self,
        label: &str,
        layout: &Self::BindGroupLayout,
        uniform: &Self::Buffer,
    ) -> Self::BindGroup;

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_, Self>) -> Self::Pipeline;

    /// Queues a write; visible to the next submission.
    fn write_buffer(&mut self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    /// Acquires the next surface image.
    fn acquire_target(&mut self) -> Result<Self::Target, wgpu::SurfaceError>;

    /// Applies recovery for a failed acquisition and reports what to do next.
    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction;

    /// Records `pass` into a fresh command buffer, submits it, and presents
    /// `target`. Must not wait for the GPU.
    fn submit_pass(&mut self, target: Self::Target, pass: &DrawPass<'_, Self>);
}

/// Everything needed to build the single render pipeline.
pub struct PipelineDesc<'a, B: GpuBackend> {
    pub label: &'a str,
    pub shader: &'a B::Shader,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub vertex_layout: wgpu::VertexBufferLayout<'a>,
    pub bind_group_layout: &'a B::BindGroupLayout,
    pub target_format: wgpu::TextureFormat,
}

/// One render pass: clear, bind, draw.
pub struct DrawPass<'a, B: GpuBackend> {
    pub label: &'a str,
    pub clear: Color,
    pub pipeline: &'a B::Pipeline,
    pub vertex_buffer: &'a B::Buffer,
    /// Bound at group 0.
    pub bind_group: &'a B::BindGroup,
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}
