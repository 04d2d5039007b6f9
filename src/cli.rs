//! Command-line interface argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Sales dashboard - charts over the food, users, orders and restaurant
/// sheets of a food-delivery workbook, served in the browser.
///
/// Examples:
///   sales-dashboard --data zomato_data.xlsx
///   sales-dashboard --data data/zomato_data.xlsx --bind 0.0.0.0:8080
///   sales-dashboard --config dashboard.toml --verbose
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Workbook to load (.xlsx)
    #[arg(short, long, value_name = "FILE", env = "DASHBOARD_DATA")]
    pub data: Option<PathBuf>,

    /// Address the web server listens on
    #[arg(short, long, value_name = "ADDR", env = "DASHBOARD_BIND")]
    pub bind: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for dashboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the default configuration file and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
