use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{ProducerError, Result};

/// Sets up the logging subscriber for the process.
///
/// `RUST_LOG` wins when set; otherwise `component` logs at INFO.
///
/// # Arguments
/// * `component` - Target name to enable by default (usually the crate name)
pub fn init_logger(component: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", component, Level::INFO)));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_ansi(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ProducerError::Configuration(format!("failed to initialize logger: {}", e)))
}
