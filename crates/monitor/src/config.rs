//! Monitor configuration

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use loadcell_driver::{DriverConfig, SerialConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "loadcell.toml";

/// Environment variable prefix, e.g. `LOADCELL__SERIAL__BAUD_RATE=9600`
pub const ENV_PREFIX: &str = "LOADCELL";

/// How decoded statuses are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One log line per status
    #[default]
    Text,
    /// One JSON object per line on stdout
    Json,
}

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Serial line settings
    pub serial: SerialConfig,

    /// Buffering, framing and diagnostics
    pub driver: DriverConfig,

    /// Recorded capture to replay instead of opening the serial port
    pub replay: Option<PathBuf>,

    pub output: OutputFormat,

    /// Log level filter
    pub log_level: String,

    /// Emit logs as JSON
    pub log_json: bool,

    /// Send the poll command before each receive
    pub poll: bool,

    /// Delay before reopening the transport after a read failure (milliseconds)
    pub reopen_delay_ms: u64,

    /// Exit with an error on the first rejected frame
    pub abort_on_fault: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            driver: DriverConfig::default(),
            replay: None,
            output: OutputFormat::Text,
            log_level: "info".to_string(),
            log_json: false,
            poll: false,
            reopen_delay_ms: 1000,
            abort_on_fault: false,
        }
    }
}

impl MonitorConfig {
    /// Load from `path` (required) or [`DEFAULT_CONFIG_FILE`] (optional),
    /// with `LOADCELL__*` environment variables layered on top
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };
        Self::from_builder(Config::builder().add_source(file))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
