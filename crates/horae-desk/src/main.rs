mod app;
mod cli;
mod controls;

use anyhow::{Context, Result};
use clap::Parser;

use horae_clock::ThreadedLoader;
use horae_engine::device::GpuInit;
use horae_engine::logging::{LoggingConfig, init_logging};
use horae_engine::window::Runtime;

use crate::app::DeskApp;
use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    let catalog = cli.font_catalog();
    log::info!("{} font files registered", catalog.len());
    let loader = ThreadedLoader::spawn(catalog).context("failed to start the asset loader")?;

    let app = DeskApp::new(cli.clock_config(), loader, cli.startup_images());
    Runtime::run(cli.runtime_config(), GpuInit::default(), app)
}
