mod args;
mod headless;
mod viewer;

use anyhow::Result;
use clap::Parser;

use cube_engine::device::GpuInit;
use cube_engine::logging::{LoggingConfig, init_logging};
use cube_engine::render::CubeConfig;
use cube_engine::window::{Runtime, RuntimeConfig};

use args::Args;
use viewer::CubeViewer;

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::default();
    if let Some(filter) = &args.log_filter {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging);

    let config = CubeConfig::default().with_color_mode(args.color_mode());

    match args.headless {
        Some(frames) => headless::run(config, frames),
        None => Runtime::run(
            RuntimeConfig::default()
                .with_title("Rotating cube")
                .with_size(args.width, args.height),
            GpuInit::default(),
            CubeViewer::new(config),
        ),
    }
}
