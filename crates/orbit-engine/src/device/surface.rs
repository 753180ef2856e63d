use winit::dpi::PhysicalSize;

use super::backend::GpuBackend;
use super::{InitError, SurfaceErrorAction};

/// Result of asking the surface for this frame's image.
#[derive(Debug)]
pub enum Acquire<T> {
    /// Render into this image.
    Target(T),
    /// Nothing to render into this tick; skip the frame silently.
    Skip,
    /// The surface cannot recover; the host should shut down.
    Fatal,
}

/// Tracks the drawable surface: pixel format, physical size and scale factor.
///
/// The manager decides when the backing store must be reconfigured; the
/// backend owns the actual swapchain. A zero-sized surface is accepted but is
/// not presentable, and the renderer skips frames until a positive size
/// arrives.
#[derive(Debug, Clone)]
pub struct SurfaceManager {
    format: Option<wgpu::TextureFormat>,
    size: PhysicalSize<u32>,
    scale_factor: f64,
}

impl SurfaceManager {
    pub fn new(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        Self {
            format: None,
            size,
            scale_factor: sanitize_scale(scale_factor),
        }
    }

    /// Selects the pixel format and configures the backing store.
    pub fn configure<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        prefer_srgb: bool,
    ) -> Result<wgpu::TextureFormat, InitError> {
        let formats = backend.surface_formats();
        let format = choose_surface_format(&formats, prefer_srgb).ok_or_else(|| {
            InitError::NoSurface("surface reports no supported formats".to_string())
        })?;

        self.format = Some(format);
        self.reconfigure(backend);

        log::debug!(
            "surface configured: {:?} {}x{}",
            format,
            self.size.width,
            self.size.height
        );
        Ok(format)
    }

    /// Applies a resize given in logical pixels.
    ///
    /// Returns `true` when the backing store must be reconfigured.
    pub fn on_resize(&mut self, logical_width: f64, logical_height: f64) -> bool {
        let size = PhysicalSize::new(
            to_physical(logical_width, self.scale_factor),
            to_physical(logical_height, self.scale_factor),
        );
        self.on_physical_resize(size)
    }

    /// Applies a resize already expressed in physical pixels.
    ///
    /// Returns `true` when the backing store must be reconfigured.
    pub fn on_physical_resize(&mut self, size: PhysicalSize<u32>) -> bool {
        let changed = size != self.size;
        self.size = size;

        if !self.is_presentable() {
            log::debug!("surface not presentable at {}x{}", size.width, size.height);
            return false;
        }

        changed
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = sanitize_scale(scale_factor);
    }

    /// Pushes the current format and size to the backend, if presentable.
    pub fn reconfigure<B: GpuBackend>(&self, backend: &mut B) {
        if let (Some(format), true) = (self.format, self.is_presentable()) {
            backend.configure_surface(format, self.size);
        }
    }

    /// Returns this frame's image, or why there is none.
    pub fn current_target<B: GpuBackend>(&self, backend: &mut B) -> Acquire<B::Target> {
        if self.format.is_none() || !self.is_presentable() {
            return Acquire::Skip;
        }

        match backend.acquire_target() {
            Ok(target) => Acquire::Target(target),
            Err(err) => {
                let reason = err.to_string();
                match backend.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface acquisition failed: {reason}");
                        Acquire::Fatal
                    }
                    action => {
                        log::trace!("surface acquisition skipped ({reason}): {action:?}");
                        Acquire::Skip
                    }
                }
            }
        }
    }

    pub fn is_presentable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    pub fn format(&self) -> Option<wgpu::TextureFormat> {
        self.format
    }

    /// Current size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }
}

fn sanitize_scale(scale_factor: f64) -> f64 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    }
}

fn to_physical(logical: f64, scale_factor: f64) -> u32 {
    let px = (logical * scale_factor).round();
    if px.is_finite() && px > 0.0 {
        px.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| formats.contains(f)) {
            return Some(f);
        }
    }

    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}
