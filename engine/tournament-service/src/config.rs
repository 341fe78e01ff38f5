//! Service configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides, e.g. `TOURNEY_LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "TOURNEY";

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Template sources
    pub templates: TemplateConfig,

    /// Result output settings
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

/// Template sources loaded at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// JSON file with tenant-supplied templates
    pub custom_file: Option<PathBuf>,
}

/// Result output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print result JSON
    pub pretty: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Load configuration: defaults, then the optional TOML file, then environment variables
pub fn load_config(config_file: Option<&Path>) -> Result<ServiceConfig> {
    let mut builder = ::config::Config::builder();

    if let Some(path) = config_file {
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(::config::File::from(path).required(true));
    }

    builder = builder.add_source(
        ::config::Environment::with_prefix(ENV_PREFIX).prefix_separator("_").separator("__"),
    );

    let config: ServiceConfig = builder
        .build()
        .context("Failed to read configuration sources")?
        .try_deserialize()
        .context("Failed to parse configuration")?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if let Some(path) = &config.templates.custom_file {
        if !path.exists() {
            return Err(anyhow::anyhow!("Custom template file does not exist: {:?}", path));
        }
    }

    Ok(())
}
