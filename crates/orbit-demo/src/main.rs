use winit::dpi::LogicalSize;

use orbit_engine::device::GpuInit;
use orbit_engine::logging::{LoggingConfig, init_logging};
use orbit_engine::render::RendererConfig;
use orbit_engine::window::{Runtime, RuntimeConfig};

fn main() {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Orbit".to_string(),
        initial_size: LogicalSize::new(640.0, 480.0),
    };

    log::info!("starting {}", config.title);

    if let Err(e) = Runtime::run(config, GpuInit::default(), RendererConfig::default()) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
