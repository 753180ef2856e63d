//! In-memory `GpuBackend` that records every call for assertions.

use std::collections::VecDeque;
use std::ops::Range;

use winit::dpi::PhysicalSize;

use crate::paint::Color;

use super::backend::{DrawPass, GpuBackend, PipelineDesc};
use super::error::map_surface_error;
use super::{InitError, SurfaceErrorAction};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedBuffer {
    pub label: String,
    pub usage: wgpu::BufferUsages,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedPipeline {
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub array_stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
    pub bind_group_layout: usize,
    pub target_format: wgpu::TextureFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedPass {
    pub target: usize,
    pub clear: Color,
    pub pipeline: usize,
    pub vertex_buffer: usize,
    pub bind_group: usize,
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

#[derive(Debug)]
pub(crate) struct RecordingBackend {
    pub formats: Vec<wgpu::TextureFormat>,
    pub alignment: u32,
    pub prefer_srgb: bool,
    pub reject_shaders: bool,

    pub configured: Vec<(wgpu::TextureFormat, PhysicalSize<u32>)>,
    pub shaders: Vec<String>,
    pub buffers: Vec<RecordedBuffer>,
    pub layouts: Vec<Vec<wgpu::BindGroupLayoutEntry>>,
    /// `(layout, uniform buffer)` per bind group.
    pub bind_groups: Vec<(usize, usize)>,
    pub pipelines: Vec<RecordedPipeline>,

    pub acquire_errors: VecDeque<wgpu::SurfaceError>,
    pub acquired: usize,
    pub reconfigured_after_error: usize,
    pub submissions: Vec<RecordedPass>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            formats: vec![
                wgpu::TextureFormat::Bgra8Unorm,
                wgpu::TextureFormat::Bgra8UnormSrgb,
            ],
            alignment: 256,
            prefer_srgb: true,
            reject_shaders: false,
            configured: Vec::new(),
            shaders: Vec::new(),
            buffers: Vec::new(),
            layouts: Vec::new(),
            bind_groups: Vec::new(),
            pipelines: Vec::new(),
            acquire_errors: VecDeque::new(),
            acquired: 0,
            reconfigured_after_error: 0,
            submissions: Vec::new(),
        }
    }
}

impl RecordingBackend {
    pub fn buffer(&self, label: &str) -> Option<&RecordedBuffer> {
        self.buffers.iter().find(|b| b.label == label)
    }
}

impl GpuBackend for RecordingBackend {
    type Shader = usize;
    type Buffer = usize;
    type BindGroupLayout = usize;
    type BindGroup = usize;
    type Pipeline = usize;
    type Target = usize;

    fn surface_formats(&self) -> Vec<wgpu::TextureFormat> {
        self.formats.clone()
    }

    fn prefers_srgb(&self) -> bool {
        self.prefer_srgb
    }

    fn min_uniform_buffer_offset_alignment(&self) -> u32 {
        self.alignment
    }

    fn configure_surface(&mut self, format: wgpu::TextureFormat, size: PhysicalSize<u32>) {
        self.configured.push((format, size));
    }

    fn create_shader(&mut self, label: &str, wgsl: &str) -> Result<usize, InitError> {
        if self.reject_shaders {
            return Err(InitError::ShaderCompile(format!("{label}: rejected by device")));
        }
        self.shaders.push(wgsl.to_string());
        Ok(self.shaders.len() - 1)
    }

    fn create_buffer_init(
        &mut self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> usize {
        self.buffers.push(RecordedBuffer {
            label: label.to_string(),
            usage,
            data: contents.to_vec(),
        });
        self.buffers.len() - 1
    }

    fn create_buffer(&mut self, label: &str, size: u64, usage: wgpu::BufferUsages) -> usize {
        self.create_buffer_init(label, &vec![0; size as usize], usage)
    }

    fn create_bind_group_layout(
        &mut self,
        _label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> usize {
        self.layouts.push(entries.to_vec());
        self.layouts.len() - 1
    }

    fn create_uniform_bind_group(&mut self, _label: &str, layout: &usize, uniform: &usize) -> usize {
        self.bind_groups.push((*layout, *uniform));
        self.bind_groups.len() - 1
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_, Self>) -> usize {
        self.pipelines.push(RecordedPipeline {
            vertex_entry: desc.vertex_entry.to_string(),
            fragment_entry: desc.fragment_entry.to_string(),
            array_stride: desc.vertex_layout.array_stride,
            attributes: desc.vertex_layout.attributes.to_vec(),
            bind_group_layout: *desc.bind_group_layout,
            target_format: desc.target_format,
        });
        self.pipelines.len() - 1
    }

    fn write_buffer(&mut self, buffer: &usize, offset: u64, data: &[u8]) {
        let start = offset as usize;
        let dst = &mut self.buffers[*buffer].data;
        dst[start..start + data.len()].copy_from_slice(data);
    }

    fn acquire_target(&mut self) -> Result<usize, wgpu::SurfaceError> {
        if let Some(err) = self.acquire_errors.pop_front() {
            return Err(err);
        }
        self.acquired += 1;
        Ok(self.acquired - 1)
    }

    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let mut reconfigured = false;
        let action = map_surface_error(err, || reconfigured = true);
        if reconfigured {
            self.reconfigured_after_error += 1;
        }
        action
    }

    fn submit_pass(&mut self, target: usize, pass: &DrawPass<'_, Self>) {
        self.submissions.push(RecordedPass {
            target,
            clear: pass.clear,
            pipeline: *pass.pipeline,
            vertex_buffer: *pass.vertex_buffer,
            bind_group: *pass.bind_group,
            vertices: pass.vertices.clone(),
            instances: pass.instances.clone(),
        });
    }
}
