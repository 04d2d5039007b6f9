#![cfg(not(tarpaulin_include))]

use clap::Parser;
use dashboard::chart::{ChartError, ChartOptions, save_png};
use dashboard::config::{Config, DataConfig};
use dashboard::error::DashboardError;
use dashboard::loader::load_dataset;
use dashboard::section::{PageQuery, Section, build_page};
use std::path::PathBuf;

/// Render every chart of every section to PNG files
#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Workbook to load (.xlsx)
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Directory the images are written to
    #[arg(short, long, value_name = "DIR", default_value = "graph_output")]
    out: PathBuf,
}

fn main() -> Result<(), DashboardError> {
    let args = PreviewArgs::parse();
    env_logger::init();

    let config = Config::load_default()?.unwrap_or_default();
    let data = DataConfig {
        path: args.data.unwrap_or(config.data.path.clone()),
        ..config.data.clone()
    };
    let dataset = load_dataset(&data)?;

    std::fs::create_dir_all(&args.out)?;
    let options = ChartOptions::from(&config.charts);

    for section in Section::ALL {
        let page = build_page(section, &dataset, &config.menu, &PageQuery::default());
        for (i, chart) in page.charts().enumerate() {
            let path = args.out.join(format!("{}_{}.png", section.slug(), i));
            match save_png(chart, &options, &path) {
                Ok(()) => println!("Created {} graph at {}", chart.title, path.display()),
                Err(ChartError::Empty(title)) => println!("Skipped {} (no data)", title),
                Err(e) => eprintln!("Failed to render {}: {}", chart.title, e),
            }
        }
    }

    Ok(())
}
