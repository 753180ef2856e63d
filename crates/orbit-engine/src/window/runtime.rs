use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit, InitError, SurfaceManager};
use crate::render::{FrameOutcome, Renderer, RendererConfig, TRIANGLE_SHADER};
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "orbit".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
        }
    }
}

/// Entry point for the native host.
///
/// Creates one window, initializes the renderer against it and redraws
/// continuously, paced by the surface's present mode.
pub struct Runtime;

impl Runtime {
    /// Runs until the window closes.
    ///
    /// Returns an error if the event loop fails, the window cannot be created,
    /// or the renderer could not be initialized. In the latter cases no frame
    /// is ever drawn.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit, renderer: RendererConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, renderer);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(err) = state.startup_error {
            return Err(err);
        }

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[not_covariant]
    renderer: Renderer<Gpu<'this>>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_config: RendererConfig,

    window: Option<WindowEntry>,
    startup_error: Option<anyhow::Error>,
    exit_requested: bool,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, renderer_config: RendererConfig) -> Self {
        Self {
            config,
            gpu_init,
            renderer_config,
            window: None,
            startup_error: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let surface = SurfaceManager::new(window.inner_size(), window.scale_factor());
        let gpu_init = self.gpu_init.clone();
        let renderer_config = self.renderer_config.clone();

        let entry = WindowEntryTryBuilder {
            clock: FrameClock::new(),
            window,
            renderer_builder: |w| {
                let mut renderer = Renderer::new(surface, renderer_config);
                renderer
                    .initialize(|| pollster::block_on(Gpu::new(w, gpu_init)), TRIANGLE_SHADER)
                    .map(|()| renderer)
            },
        }
        .try_build()
        .map_err(|e: InitError| anyhow::Error::new(e).context("renderer initialization failed"))?;

        self.window = Some(entry);
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            // Reported by `Runtime::run` once the loop exits.
            log::debug!("startup aborted: {e:#}");
            self.startup_error = Some(e);
            self.request_exit(event_loop);
            return;
        }

        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous animation: one redraw per loop iteration, vsync-paced by FIFO.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.window = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_renderer_mut(|r| r.on_physical_resize(new_size));
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                entry.with_mut(|fields| {
                    fields.renderer.set_scale_factor(scale_factor);
                    fields.renderer.on_physical_resize(fields.window.inner_size());
                });
            }

            WindowEvent::RedrawRequested => {
                let outcome = entry.with_mut(|fields| {
                    let ft: FrameTime = fields.clock.tick();
                    let outcome = fields.renderer.render_frame(ft.elapsed);
                    if outcome == FrameOutcome::Skipped {
                        log::trace!("frame {} skipped", ft.frame_index);
                    }
                    outcome
                });

                if outcome == FrameOutcome::Fatal {
                    log::error!("surface lost; shutting down");
                    self.window = None;
                    self.request_exit(event_loop);
                }
            }

            _ => {}
        }
    }
}
