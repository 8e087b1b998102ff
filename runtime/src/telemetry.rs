use crate::config::{LogFormat, TelemetryConfig};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter '{filter}'")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
}

/// Install a stdout tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Returns `Ok(false)`
/// when a global subscriber was already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<bool, TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.filter)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().finish().try_init(),
        LogFormat::Compact => builder.compact().finish().try_init(),
        LogFormat::Json => builder.json().finish().try_init(),
    };
    Ok(installed.is_ok())
}

fn build_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|source| TelemetryError::Filter {
        filter: directives.to_string(),
        source,
    })
}
