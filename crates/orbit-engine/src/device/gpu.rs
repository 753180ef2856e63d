use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::backend::{DrawPass, GpuBackend, PipelineDesc};
use super::error::map_surface_error;
use super::surface::choose_alpha_mode;
use super::{GpuInit, InitError, SurfaceErrorAction};

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the wgpu implementation of [`GpuBackend`]:
/// - creates and stores Instance/Adapter/Device/Queue
/// - configures the Surface (swapchain) when the surface manager asks
/// - records, submits and presents one pass per frame
pub struct Gpu<'w> {
    /// Window the surface presents to.
    window: &'w Window,

    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; the window must outlive `Gpu`.
    surface: wgpu::Surface<'w>,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Surface capabilities for the selected adapter.
    caps: wgpu::SurfaceCapabilities,

    init: GpuInit,

    /// Active surface configuration; `None` until first configured.
    config: Option<wgpu::SurfaceConfiguration>,

    // Kept alive for the lifetime of the device.
    _adapter: wgpu::Adapter,
    _instance: wgpu::Instance,
}

/// An acquired swapchain image.
///
/// Short-lived: holding the surface texture blocks acquisition of the next one.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl<'w> Gpu<'w> {
    /// Acquires an adapter and device compatible with `window`'s surface.
    ///
    /// The surface is not configured here; see `SurfaceManager::configure`.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self, InitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| InitError::NoSurface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| InitError::NoDevice(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orbit device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| InitError::NoDevice(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let caps = surface.get_capabilities(&adapter);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            caps,
            init,
            config: None,
            _adapter: adapter,
            _instance: instance,
        })
    }
}

impl<'w> GpuBackend for Gpu<'w> {
    type Shader = wgpu::ShaderModule;
    type Buffer = wgpu::Buffer;
    type BindGroupLayout = wgpu::BindGroupLayout;
    type BindGroup = wgpu::BindGroup;
    type Pipeline = wgpu::RenderPipeline;
    type Target = GpuFrame;

    fn surface_formats(&self) -> Vec<wgpu::TextureFormat> {
        self.caps.formats.clone()
    }

    fn prefers_srgb(&self) -> bool {
        self.init.prefer_srgb
    }

    fn min_uniform_buffer_offset_alignment(&self) -> u32 {
        self.device.limits().min_uniform_buffer_offset_alignment
    }

    fn configure_surface(&mut self, format: wgpu::TextureFormat, size: PhysicalSize<u32>) {
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: self.init.present_mode,
            alpha_mode: choose_alpha_mode(&self.caps.alpha_modes, self.init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: self.init.desired_maximum_frame_latency,
        };

        self.surface.configure(&self.device, &config);
        self.config = Some(config);
    }

    fn create_shader(&mut self, label: &str, wgsl: &str) -> Result<Self::Shader, InitError> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });

        match pollster::block_on(scope.pop()) {
            Some(err) => Err(InitError::ShaderCompile(err.to_string())),
            None => Ok(module),
        }
    }

    fn create_buffer_init(
        &mut self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Self::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        })
    }

    fn create_buffer(&mut self, label: &str, size: u64, usage: wgpu::BufferUsages) -> Self::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group_layout(
        &mut self,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> Self::BindGroupLayout {
        self.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
    }

    fn create_uniform_bind_group(
        &mut self,
        label: &str,
        layout: &Self::BindGroupLayout,
        uniform: &Self::Buffer,
    ) -> Self::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        })
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_, Self>) -> Self::Pipeline {
        let pipeline_layout =
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(desc.label),
                    bind_group_layouts: &[desc.bind_group_layout],
                    immediate_size: 0,
                });

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: desc.shader,
                entry_point: Some(desc.vertex_entry),
                compilation_options: Default::default(),
                buffers: &[desc.vertex_layout.clone()],
            },

            fragment: Some(wgpu::FragmentState {
                module: desc.shader,
                entry_point: Some(desc.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    fn write_buffer(&mut self, buffer: &Self::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    fn acquire_target(&mut self) -> Result<Self::Target, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(GpuFrame {
            surface_texture,
            view,
        })
    }

    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let (surface, device, config) = (&self.surface, &self.device, &self.config);
        map_surface_error(err, || {
            if let Some(config) = config {
                surface.configure(device, config);
            }
        })
    }

    fn submit_pass(&mut self, target: Self::Target, pass: &DrawPass<'_, Self>) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("orbit frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(pass.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(pass.clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(pass.pipeline);
            rpass.set_bind_group(0, pass.bind_group, &[]);
            rpass.set_vertex_buffer(0, pass.vertex_buffer.slice(..));
            rpass.draw(pass.vertices.clone(), pass.instances.clone());
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        self.window.pre_present_notify();
        let GpuFrame {
            surface_texture,
            view,
        } = target;
        drop(view);
        surface_texture.present();
    }
}
