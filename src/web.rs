#![cfg(not(tarpaulin_include))]

use clap::Parser;
use dashboard::app;
use dashboard::cli::Args;
use dashboard::config::Config;
use dashboard::loader::load_dataset;
use log::{error, info};
use std::process::ExitCode;

/// Main entry point for the dashboard web server
///
/// Resolves the configuration, loads the workbook once and serves the
/// dashboard. A workbook that cannot be loaded is reported and the process
/// exits with a failure code before anything is served.
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if args.print_config {
        print!("{}", Config::default_toml());
        return ExitCode::SUCCESS;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    let config = match Config::resolve(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Loading workbook {}", config.data.path.display());
    let dataset = match load_dataset(&config.data) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("{}", e);
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = app::run(config, dataset).await {
        error!("Server stopped: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
