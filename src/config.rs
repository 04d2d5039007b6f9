//! Configuration file handling.
//!
//! Settings come from an optional `dashboard.toml`; every field has a
//! default so the file may be partial or absent. Command-line flags are
//! merged on top.

use crate::cli::Args;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub charts: ChartConfig,

    #[serde(default)]
    pub menu: MenuConfig,
}

/// Workbook location and per-sheet row caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    #[serde(default = "default_food_rows")]
    pub food_rows: usize,

    #[serde(default = "default_user_rows")]
    pub user_rows: usize,

    #[serde(default = "default_order_rows")]
    pub order_rows: usize,

    #[serde(default = "default_restaurant_rows")]
    pub restaurant_rows: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            food_rows: default_food_rows(),
            user_rows: default_user_rows(),
            order_rows: default_order_rows(),
            restaurant_rows: default_restaurant_rows(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("zomato_data.xlsx")
}

fn default_food_rows() -> usize {
    371_561
}

fn default_user_rows() -> usize {
    73_662
}

fn default_order_rows() -> usize {
    150_281
}

fn default_restaurant_rows() -> usize {
    148_541
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory served under `/assets`.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            assets_dir: default_assets_dir(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

/// Pixel size of rendered chart images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,

    #[serde(default = "default_chart_height")]
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

fn default_chart_width() -> u32 {
    800
}

fn default_chart_height() -> u32 {
    400
}

/// Food Menu section settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How many of the most frequent items to chart.
    #[serde(default = "default_top_items")]
    pub top_items: usize,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            top_items: default_top_items(),
        }
    }
}

fn default_page_size() -> usize {
    25
}

fn default_top_items() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Resolve the configuration for a run: explicit `--config`, else the
    /// default file, else built-in defaults; then CLI flags on top.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?.unwrap_or_default(),
        };
        config.merge_with_args(args);
        Ok(config)
    }

    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.clone();
        }
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
    }

    /// The built-in defaults as TOML, a starting point for `dashboard.toml`.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.path, PathBuf::from("zomato_data.xlsx"));
        assert_eq!(config.data.food_rows, 371_561);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.charts.width, 800);
        assert_eq!(config.menu.page_size, 25);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[data]
path = "data/sales.xlsx"
food_rows = 100

[charts]
height = 300
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.data.path, PathBuf::from("data/sales.xlsx"));
        assert_eq!(config.data.food_rows, 100);
        assert_eq!(config.data.user_rows, 73_662);
        assert_eq!(config.charts.width, 800);
        assert_eq!(config.charts.height, 300);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config::default();
        let args = Args {
            data: Some(PathBuf::from("other.xlsx")),
            bind: Some("0.0.0.0:9000".to_string()),
            ..Args::default()
        };
        config.merge_with_args(&args);
        assert_eq!(config.data.path, PathBuf::from("other.xlsx"));
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Config::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[menu]"));
    }
}
