//! Tournament Service Library
//!
//! Composition root around the payout engine: configuration loading, logging
//! setup, tenant template loading and request settlement. The template
//! registry is built and validated here once, before any request is settled.

use std::path::Path;

use anyhow::{Context, Result};

pub mod config;
pub mod logging;
pub mod service;
pub mod templates;

pub use self::config::ServiceConfig;
pub use logging::initialize_logging;
pub use service::{ServiceState, SettlementEnvelope};

/// Load configuration from an optional file and environment variables
pub fn load_configuration(config_file: Option<&Path>) -> Result<ServiceConfig> {
    self::config::load_config(config_file).context("Failed to load service configuration")
}
