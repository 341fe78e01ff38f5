//! Logging and tracing setup

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize logging and tracing
///
/// `RUST_LOG` wins over the configured level when set. Logs go to stderr so
/// settlement JSON on stdout stays machine-readable.
pub fn initialize_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let fmt_layer = match config.format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        _ => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
            .boxed(),
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    Ok(())
}
