use winit::dpi::PhysicalSize;

use crate::device::{Acquire, DrawPass, GpuBackend, InitError, PipelineDesc, SurfaceManager};
use crate::paint::Color;
use crate::scene::{FrameState, UniformOffset, Vertex};

use super::shader::{FRAGMENT_ENTRY, VERTEX_ENTRY, validate_shader};

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Background the pass clears to.
    pub clear_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::MIDNIGHT,
        }
    }
}

/// Position in the renderer lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Status {
    Uninitialized,
    Initializing,
    Ready,
    /// Terminal. No retry.
    Failed,
}

/// What a call to [`Renderer::render_frame`] did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// Not `Ready`; nothing happened.
    NotReady,
    /// Surface had no presentable image this tick.
    Skipped,
    /// One pass was submitted and presented.
    Submitted,
    /// The surface is unrecoverable; the host should shut down.
    Fatal,
}

/// GPU resources that exist only once initialization succeeded.
///
/// Field order is drop order: everything here is released before the backend
/// that created it.
struct Live<B: GpuBackend> {
    pipeline: B::Pipeline,
    bind_group: B::BindGroup,
    _bind_group_layout: B::BindGroupLayout,
    uniform_buffer: B::Buffer,
    vertex_buffer: B::Buffer,
    _shader: B::Shader,
    backend: B,
}

enum State<B: GpuBackend> {
    Uninitialized,
    Initializing,
    Ready(Box<Live<B>>),
    Failed(InitError),
}

/// Single-pipeline renderer for the animated triangle.
///
/// The host drives it: call [`initialize`](Self::initialize) once, forward
/// resize signals, and call [`render_frame`](Self::render_frame) once per
/// tick. The renderer never schedules itself.
pub struct Renderer<B: GpuBackend> {
    state: State<B>,
    surface: SurfaceManager,
    frame_state: FrameState,
    config: RendererConfig,
}

impl<B: GpuBackend> Renderer<B> {
    pub fn new(surface: SurfaceManager, config: RendererConfig) -> Self {
        Self {
            state: State::Uninitialized,
            surface,
            frame_state: FrameState::new(),
            config,
        }
    }

    pub fn status(&self) -> Status {
        match self.state {
            State::Uninitialized => Status::Uninitialized,
            State::Initializing => Status::Initializing,
            State::Ready(_) => Status::Ready,
            State::Failed(_) => Status::Failed,
        }
    }

    /// The error that moved the renderer to `Failed`, if any.
    pub fn failure(&self) -> Option<&InitError> {
        match &self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn surface(&self) -> &SurfaceManager {
        &self.surface
    }

    pub fn frame_state(&self) -> &FrameState {
        &self.frame_state
    }

    /// The backend, once `Ready`.
    pub fn backend(&self) -> Option<&B> {
        match &self.state {
            State::Ready(live) => Some(&live.backend),
            _ => None,
        }
    }

    /// Acquires the device through `acquire`, configures the surface and
    /// builds every GPU resource the frame needs.
    ///
    /// On error the renderer becomes `Failed` for good and anything created
    /// so far is dropped. Only the first call does any work.
    pub fn initialize<F>(&mut self, acquire: F, shader_source: &str) -> Result<(), InitError>
    where
        F: FnOnce() -> Result<B, InitError>,
    {
        if !matches!(self.state, State::Uninitialized) {
            log::warn!("initialize called in state {:?}; ignored", self.status());
            return Err(InitError::AlreadyInitialized);
        }

        self.state = State::Initializing;

        match self.build(acquire, shader_source) {
            Ok(live) => {
                log::info!(
                    "renderer ready ({:?}, {}x{})",
                    self.surface.format(),
                    self.surface.size().width,
                    self.surface.size().height
                );
                self.state = State::Ready(Box::new(live));
                Ok(())
            }
            Err(err) => {
                log::debug!("renderer initialization failed: {err}");
                self.state = State::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn build<F>(&mut self, acquire: F, shader_source: &str) -> Result<Live<B>, InitError>
    where
        F: FnOnce() -> Result<B, InitError>,
    {
        let mut backend = acquire()?;

        let prefer_srgb = backend.prefers_srgb();
        let format = self.surface.configure(&mut backend, prefer_srgb)?;

        validate_shader(shader_source)?;
        let shader = backend.create_shader("orbit triangle shader", shader_source)?;

        let bind_group_layout =
            backend.create_bind_group_layout("orbit uniform bgl", &uniform_layout_entries());

        let uniform_size = uniform_buffer_size(backend.min_uniform_buffer_offset_alignment());
        let uniform_buffer = backend.create_buffer(
            "orbit offset ubo",
            uniform_size,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let vertex_buffer = backend.create_buffer_init(
            "orbit triangle vbo",
            bytemuck::cast_slice(self.frame_state.vertices()),
            wgpu::BufferUsages::VERTEX,
        );

        let bind_group = backend.create_uniform_bind_group(
            "orbit uniform bind group",
            &bind_group_layout,
            &uniform_buffer,
        );

        let pipeline = backend.create_pipeline(&PipelineDesc {
            label: "orbit triangle pipeline",
            shader: &shader,
            vertex_entry: VERTEX_ENTRY,
            fragment_entry: FRAGMENT_ENTRY,
            vertex_layout: Vertex::layout(),
            bind_group_layout: &bind_group_layout,
            target_format: format,
        });

        Ok(Live {
            pipeline,
            bind_group,
            _bind_group_layout: bind_group_layout,
            uniform_buffer,
            vertex_buffer,
            _shader: shader,
            backend,
        })
    }

    /// Applies a resize in logical pixels.
    pub fn on_resize(&mut self, logical_width: f64, logical_height: f64) {
        if self.surface.on_resize(logical_width, logical_height) {
            self.reconfigure_surface();
        }
    }

    /// Applies a resize in physical pixels.
    pub fn on_physical_resize(&mut self, size: PhysicalSize<u32>) {
        if self.surface.on_physical_resize(size) {
            self.reconfigure_surface();
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.surface.set_scale_factor(scale_factor);
    }

    fn reconfigure_surface(&mut self) {
        if let State::Ready(live) = &mut self.state {
            self.surface.reconfigure(&mut live.backend);
            let size = self.surface.size();
            log::debug!("surface resized to {}x{}", size.width, size.height);
        }
    }

    /// Draws one frame at `now` seconds on the host's monotonic clock.
    ///
    /// Uploads the uniform, clears, draws the triangle once and submits
    /// without waiting on the GPU.
    pub fn render_frame(&mut self, now: f64) -> FrameOutcome {
        let State::Ready(live) = &mut self.state else {
            return FrameOutcome::NotReady;
        };
        let live: &mut Live<B> = live;

        if !self.surface.is_presentable() {
            log::trace!("frame skipped: surface not presentable");
            return FrameOutcome::Skipped;
        }

        let uniform: UniformOffset = self.frame_state.uniform_at(now);
        live.backend
            .write_buffer(&live.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let target = match self.surface.current_target(&mut live.backend) {
            Acquire::Target(target) => target,
            Acquire::Skip => return FrameOutcome::Skipped,
            Acquire::Fatal => return FrameOutcome::Fatal,
        };

        let vertex_count = self.frame_state.vertices().len() as u32;
        let pass = DrawPass {
            label: "orbit triangle pass",
            clear: self.config.clear_color,
            pipeline: &live.pipeline,
            vertex_buffer: &live.vertex_buffer,
            bind_group: &live.bind_group,
            vertices: 0..vertex_count,
            instances: 0..1,
        };
        live.backend.submit_pass(target, &pass);

        FrameOutcome::Submitted
    }
}

/// Explicit layout for the single resource slot: the offset uniform at binding 0.
pub(crate) fn uniform_layout_entries() -> [wgpu::BindGroupLayoutEntry; 1] {
    [wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<UniformOffset>() as u64),
        },
        count: None,
    }]
}

/// Uniform buffer size: the 16-byte block rounded up to the device's uniform
/// alignment.
pub(crate) fn uniform_buffer_size(alignment: u32) -> u64 {
    let size = std::mem::size_of::<UniformOffset>() as u64;
    let alignment = (alignment as u64).max(1);
    size.div_ceil(alignment) * alignment
}
