use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning the workbook into typed record tables.
///
/// All of these are configuration errors: they are reported once at startup
/// and the server never binds with a partially loaded dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to open workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("failed to read sheet `{sheet}`: {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("sheet `{0}` not found in workbook")]
    MissingSheet(String),

    #[error("sheet `{0}` has no header row")]
    EmptySheet(String),

    #[error("sheet `{sheet}` is missing column `{column}`")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet `{sheet}` row {row}, column `{column}`: {message}")]
    InvalidValue {
        sheet: String,
        row: usize,
        column: String,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level error for the binaries.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "web")]
    #[error("{0}")]
    Template(#[from] handlebars::TemplateError),
}
