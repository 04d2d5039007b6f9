/*!
# Sales Dashboard

A browser-based sales analytics dashboard for a food-delivery platform,
built in Rust.

## Overview

The dashboard loads a single Excel workbook with `food`, `users`, `orders`
and `restaurant` sheets, validates every sheet against a typed row schema and
serves descriptive statistics and charts for six sections: Overview, Food,
Food Menu, Orders, Restaurant and User.

## Architecture

### Data Layer
- **Technologies**: calamine
- **Key Components**:
  - Record Schema - One typed struct per sheet, columns resolved by
    normalized header name
  - Loader - Reads the workbook once at startup, applies per-sheet row caps
  - Dataset - Read-only tables shared by every request

### Analysis Layer
- Frequency counts, unique counts per group, cross tabulations and grouped
  sums over any record field
- Numeric and categorical summaries (count, mean, quartiles, top value)

### Presentation Layer
- **Technologies**: axum, handlebars, plotters
- **Core Components**:
  - Section Builder - Turns the dataset into panels of text, tables and charts
  - Chart Renderer - Draws bar, pie, line and grouped bar charts to PNG
  - Exporter - Chart data as CSV or XLSX

## Modules

- **record**: Sheet schemas and cell conversion
- **table**: Record tables and the dataset
- **loader**: Workbook loading
- **aggregate**: Counting and summary statistics
- **chart**: Chart model and PNG rendering
- **section**: Navigation sections and page building
- **export**: CSV and XLSX downloads
- **config** / **cli**: `dashboard.toml` and command-line flags
- **app**: Routing and handlers

## REST API Endpoints

- `/section/{slug}` - Rendered section page
- `/api/section/{slug}` - Section page as JSON
- `/chart/{slug}/{index}` - One chart of a section as PNG
- `/export/{slug}/{csv|xlsx}` - Chart data of a section
*/

pub mod aggregate;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod record;
pub mod section;
pub mod table;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod export;

pub use error::{ConfigError, DashboardError, LoadError};
pub use loader::load_dataset;
pub use table::{Dataset, RecordTable};
